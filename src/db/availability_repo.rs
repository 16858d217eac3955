// src/db/availability_repo.rs

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, models::availability::AvailabilityWindow};

/// Filtro temporal da listagem de janelas do veterinário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WindowPeriod {
    Future,
    Past,
}

#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura (pool principal)
    // ---

    /// Janelas do veterinário, da mais recente para a mais antiga.
    /// `Future`/`Past` olham para `date_end` em relação a hoje;
    /// `covers_date` restringe às janelas que contêm a data buscada.
    pub async fn list_for_vet(
        &self,
        veterinarian_id: Uuid,
        period: WindowPeriod,
        covers_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<AvailabilityWindow>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM availability_windows WHERE veterinarian_id = ",
        );
        qb.push_bind(veterinarian_id);

        match period {
            WindowPeriod::Future => {
                qb.push(" AND date_end >= ").push_bind(today);
            }
            WindowPeriod::Past => {
                qb.push(" AND date_end < ").push_bind(today);
            }
        }

        if let Some(date) = covers_date {
            qb.push(" AND date_start <= ").push_bind(date);
            qb.push(" AND date_end >= ").push_bind(date);
        }

        qb.push(" ORDER BY date_start DESC, daily_time_start");

        let windows = qb
            .build_query_as::<AvailabilityWindow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(windows)
    }

    // ---
    // Escrita (transacional, via Executor)
    // ---

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        veterinarian_id: Uuid,
        clinic_id: Uuid,
        date_start: NaiveDate,
        date_end: NaiveDate,
        daily_time_start: NaiveTime,
        daily_time_end: NaiveTime,
        slot_duration_minutes: i32,
    ) -> Result<AvailabilityWindow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let window = sqlx::query_as::<_, AvailabilityWindow>(
            r#"
            INSERT INTO availability_windows
                (veterinarian_id, clinic_id, date_start, date_end,
                 daily_time_start, daily_time_end, slot_duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(veterinarian_id)
        .bind(clinic_id)
        .bind(date_start)
        .bind(date_end)
        .bind(daily_time_start)
        .bind(daily_time_end)
        .bind(slot_duration_minutes)
        .fetch_one(executor)
        .await?;
        Ok(window)
    }

    pub async fn get_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<AvailabilityWindow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let window = sqlx::query_as::<_, AvailabilityWindow>(
            "SELECT * FROM availability_windows WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(window)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM availability_windows WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
