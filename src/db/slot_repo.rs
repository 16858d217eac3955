// src/db/slot_repo.rs
//
// Fronteira de persistência dos turnos. Nenhuma regra de negócio aqui:
// guardas e orquestração ficam nos serviços.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        agenda::AgendaEntry,
        availability::AvailabilityWindow,
        slot::{Slot, SlotStatus},
    },
};

/// Dados de criação de um turno (gerado ou manual).
#[derive(Debug)]
pub struct NewSlot<'a> {
    pub clinic_id: Uuid,
    pub veterinarian_id: Uuid,
    pub client_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub duration_minutes: i32,
    pub consultation_type: &'a str,
    pub reason: &'a str,
    pub status: SlotStatus,
    pub reserved: bool,
    pub created_by: Option<Uuid>,
}

/// Filtros da listagem de agenda (veterinário, clínica ou cliente).
#[derive(Debug, Default)]
pub struct AgendaQuery {
    pub clinic_id: Option<Uuid>,
    pub veterinarian_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<SlotStatus>,
    pub reserved_only: bool,
    pub date_from: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura (pool principal)
    // ---

    /// Turnos livres e futuros de uma clínica, ordenados por (data, hora).
    pub async fn list_open(
        &self,
        clinic_id: Uuid,
        veterinarian_id: Option<Uuid>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<Slot>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT * FROM slots WHERE reserved = FALSE AND status = ",
        );
        qb.push_bind(SlotStatus::Pending);
        qb.push(" AND clinic_id = ").push_bind(clinic_id);

        if let Some(vet) = veterinarian_id {
            qb.push(" AND veterinarian_id = ").push_bind(vet);
        }
        match date {
            Some(d) => {
                qb.push(" AND date = ").push_bind(d);
            }
            None => {
                qb.push(" AND date >= ").push_bind(today);
            }
        }

        qb.push(" ORDER BY date, time_start");

        let slots = qb.build_query_as::<Slot>().fetch_all(&self.pool).await?;
        Ok(slots)
    }

    /// Datas distintas que ainda têm turno livre, para o filtro de datas
    /// da tela de reserva.
    pub async fn open_dates(
        &self,
        clinic_id: Uuid,
        veterinarian_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT date FROM slots WHERE reserved = FALSE AND status = ",
        );
        qb.push_bind(SlotStatus::Pending);
        qb.push(" AND clinic_id = ").push_bind(clinic_id);
        qb.push(" AND date >= ").push_bind(today);

        if let Some(vet) = veterinarian_id {
            qb.push(" AND veterinarian_id = ").push_bind(vet);
        }

        qb.push(" ORDER BY date");

        let dates = qb
            .build_query_scalar::<NaiveDate>()
            .fetch_all(&self.pool)
            .await?;
        Ok(dates)
    }

    /// Listagem com os nomes que as agendas exibem.
    pub async fn list_agenda(&self, filter: &AgendaQuery) -> Result<Vec<AgendaEntry>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT s.*,
                   v.full_name AS veterinarian_name,
                   c.full_name AS client_name,
                   p.name AS pet_name
            FROM slots s
            JOIN users v ON v.id = s.veterinarian_id
            LEFT JOIN users c ON c.id = s.client_id
            LEFT JOIN pets p ON p.id = s.pet_id
            WHERE 1 = 1
            "#,
        );

        if let Some(clinic) = filter.clinic_id {
            qb.push(" AND s.clinic_id = ").push_bind(clinic);
        }
        if let Some(vet) = filter.veterinarian_id {
            qb.push(" AND s.veterinarian_id = ").push_bind(vet);
        }
        if let Some(client) = filter.client_id {
            qb.push(" AND s.client_id = ").push_bind(client);
        }
        if let Some(status) = filter.status {
            qb.push(" AND s.status = ").push_bind(status);
        }
        if filter.reserved_only {
            qb.push(" AND s.reserved = TRUE AND s.client_id IS NOT NULL");
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND s.date >= ").push_bind(from);
        }

        qb.push(" ORDER BY s.date, s.time_start");

        let entries = qb
            .build_query_as::<AgendaEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    // ---
    // Consultas usadas dentro de transações (via Executor)
    // ---

    pub async fn get_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Slot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(slot)
    }

    /// Busca com lock pessimista de linha. É o que serializa duas reservas
    /// concorrentes sobre o mesmo turno.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Slot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(slot)
    }

    /// Já existe turno deste veterinário começando exatamente neste
    /// instante? (chave natural)
    pub async fn exists_at<'e, E>(
        &self,
        executor: E,
        veterinarian_id: Uuid,
        date: NaiveDate,
        time_start: NaiveTime,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM slots
                WHERE veterinarian_id = $1 AND date = $2 AND time_start = $3
            )
            "#,
        )
        .bind(veterinarian_id)
        .bind(date)
        .bind(time_start)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Algum turno do veterinário na data intersecta `[start, end)`?
    pub async fn has_overlap<'e, E>(
        &self,
        executor: E,
        veterinarian_id: Uuid,
        date: NaiveDate,
        time_start: NaiveTime,
        time_end: NaiveTime,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let overlaps = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM slots
                WHERE veterinarian_id = $1
                  AND date = $2
                  AND time_start < $4
                  AND time_end > $3
            )
            "#,
        )
        .bind(veterinarian_id)
        .bind(date)
        .bind(time_start)
        .bind(time_end)
        .fetch_one(executor)
        .await?;
        Ok(overlaps)
    }

    // ---
    // Escrita (transacional, via Executor)
    // ---

    pub async fn insert<'e, E>(&self, executor: E, new: &NewSlot<'_>) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Slot>(
            r#"
            INSERT INTO slots
                (clinic_id, veterinarian_id, client_id, pet_id, date,
                 time_start, time_end, duration_minutes, consultation_type,
                 reason, status, reserved, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new.clinic_id)
        .bind(new.veterinarian_id)
        .bind(new.client_id)
        .bind(new.pet_id)
        .bind(new.date)
        .bind(new.time_start)
        .bind(new.time_end)
        .bind(new.duration_minutes)
        .bind(new.consultation_type)
        .bind(new.reason)
        .bind(new.status)
        .bind(new.reserved)
        .bind(new.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Corrida na chave (veterinario, data, hora_inicio):
                // outro turno ocupou o instante entre a checagem e o INSERT.
                if db_err.is_unique_violation() {
                    return AppError::SlotOverlap;
                }
            }
            e.into()
        })
    }

    /// Reserva condicional: só escreve se o turno ainda estiver livre.
    /// Retorna `None` quando o predicado não casa mais (perdeu a corrida).
    pub async fn claim<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_id: Uuid,
        pet_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<Slot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET client_id = $2,
                pet_id = $3,
                reserved = TRUE,
                status = $4,
                reason = COALESCE($5, reason)
            WHERE id = $1 AND reserved = FALSE AND status = $6
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(client_id)
        .bind(pet_id)
        .bind(SlotStatus::Confirmed)
        .bind(reason)
        .bind(SlotStatus::Pending)
        .fetch_optional(executor)
        .await?;
        Ok(slot)
    }

    /// Devolve o turno: limpa ocupante e motivo, volta a `Pending`.
    pub async fn release<'e, E>(&self, executor: E, id: Uuid) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET client_id = NULL,
                pet_id = NULL,
                reserved = FALSE,
                status = $2,
                reason = ''
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(SlotStatus::Pending)
        .fetch_one(executor)
        .await?;
        Ok(slot)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SlotStatus,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot =
            sqlx::query_as::<_, Slot>("UPDATE slots SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status)
                .fetch_one(executor)
                .await?;
        Ok(slot)
    }

    /// Cancelamento administrativo: terminal, mantém o ocupante para
    /// histórico e registra o motivo.
    pub async fn cancel<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        reason: &str,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, Slot>(
            "UPDATE slots SET status = $2, reason = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(SlotStatus::Cancelled)
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(slot)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM slots WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Quantos turnos reservados caem dentro da janela?
    /// É o que bloqueia a exclusão de uma disponibilidade.
    pub async fn count_reserved_in_window<'e, E>(
        &self,
        executor: E,
        window: &AvailabilityWindow,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM slots
            WHERE veterinarian_id = $1
              AND clinic_id = $2
              AND date BETWEEN $3 AND $4
              AND time_start >= $5
              AND time_start < $6
              AND reserved = TRUE
            "#,
        )
        .bind(window.veterinarian_id)
        .bind(window.clinic_id)
        .bind(window.date_start)
        .bind(window.date_end)
        .bind(window.daily_time_start)
        .bind(window.daily_time_end)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Apaga os turnos livres da janela e devolve quantos foram.
    pub async fn delete_unreserved_in_window<'e, E>(
        &self,
        executor: E,
        window: &AvailabilityWindow,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM slots
            WHERE veterinarian_id = $1
              AND clinic_id = $2
              AND date BETWEEN $3 AND $4
              AND time_start >= $5
              AND time_start < $6
              AND reserved = FALSE
            "#,
        )
        .bind(window.veterinarian_id)
        .bind(window.clinic_id)
        .bind(window.date_start)
        .bind(window.date_end)
        .bind(window.daily_time_start)
        .bind(window.daily_time_end)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
