// src/services/availability_service.rs
//
// Orquestra a declaração de disponibilidade: valida contra o horário da
// clínica, persiste a janela e gera os turnos dela em uma única transação.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{clock, error::AppError},
    db::{
        availability_repo::WindowPeriod, slot_repo::NewSlot, AvailabilityRepository,
        DirectoryRepository, SlotRepository,
    },
    models::{
        availability::AvailabilityWindow,
        directory::{User, UserRole},
        slot::SlotStatus,
    },
};

#[derive(Clone)]
pub struct AvailabilityService {
    availability_repo: AvailabilityRepository,
    slot_repo: SlotRepository,
    directory_repo: DirectoryRepository,
}

impl AvailabilityService {
    pub fn new(
        availability_repo: AvailabilityRepository,
        slot_repo: SlotRepository,
        directory_repo: DirectoryRepository,
    ) -> Self {
        Self {
            availability_repo,
            slot_repo,
            directory_repo,
        }
    }

    /// Cria a janela e gera os turnos dela. Devolve a janela e quantos
    /// turnos novos foram criados (candidatos que colidiram com turnos
    /// existentes são pulados sem erro, então rodar de novo sobre a mesma
    /// janela cria zero).
    pub async fn create_window<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        date_start: NaiveDate,
        date_end: NaiveDate,
        daily_time_start: NaiveTime,
        daily_time_end: NaiveTime,
        slot_duration_minutes: i32,
    ) -> Result<(AvailabilityWindow, u64), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if veterinarian.role != UserRole::Veterinarian {
            return Err(AppError::Forbidden);
        }
        let clinic_id = veterinarian.clinic_id.ok_or(AppError::ClinicNotFound)?;
        let clinic = self
            .directory_repo
            .find_clinic_by_id(clinic_id)
            .await?
            .ok_or(AppError::ClinicNotFound)?;

        // Tudo validado antes de qualquer escrita.
        if date_end < date_start {
            return Err(AppError::InvalidDateRange);
        }
        if daily_time_end <= daily_time_start {
            return Err(AppError::InvalidTimeRange);
        }
        if daily_time_start < clinic.open_time || daily_time_end > clinic.close_time {
            return Err(AppError::OutsideClinicHours {
                open: clinic.open_time,
                close: clinic.close_time,
            });
        }

        let attendance = clinic.attendance_weekdays();

        let mut tx = executor.begin().await?;

        let window = self
            .availability_repo
            .insert(
                &mut *tx,
                veterinarian.id,
                clinic_id,
                date_start,
                date_end,
                daily_time_start,
                daily_time_end,
                slot_duration_minutes,
            )
            .await?;

        let mut created: u64 = 0;
        let starts = window.daily_slot_starts();
        for date in window.attendance_dates(attendance.as_ref()) {
            for &time_start in &starts {
                let time_end = clock::end_time(time_start, window.slot_duration_minutes);

                if self
                    .slot_repo
                    .exists_at(&mut *tx, window.veterinarian_id, date, time_start)
                    .await?
                {
                    continue;
                }
                if self
                    .slot_repo
                    .has_overlap(&mut *tx, window.veterinarian_id, date, time_start, time_end)
                    .await?
                {
                    continue;
                }

                self.slot_repo
                    .insert(
                        &mut *tx,
                        &NewSlot {
                            clinic_id: window.clinic_id,
                            veterinarian_id: window.veterinarian_id,
                            client_id: None,
                            pet_id: None,
                            date,
                            time_start,
                            time_end,
                            duration_minutes: window.slot_duration_minutes,
                            consultation_type: "consulta",
                            reason: "",
                            status: SlotStatus::Pending,
                            reserved: false,
                            created_by: Some(veterinarian.id),
                        },
                    )
                    .await?;
                created += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Disponibilidade {} criada: {} turno(s) gerado(s)",
            window.id,
            created
        );
        Ok((window, created))
    }

    /// Exclui a janela e os turnos livres dela. Se houver qualquer turno
    /// reservado no intervalo, nada é excluído e o chamador fica sabendo
    /// quantos bloqueiam.
    pub async fn delete_window<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        window_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let window = self
            .availability_repo
            .get_by_id(&mut *tx, window_id)
            .await?
            .ok_or(AppError::WindowNotFound)?;

        if window.veterinarian_id != veterinarian.id {
            return Err(AppError::Forbidden);
        }

        let reserved = self
            .slot_repo
            .count_reserved_in_window(&mut *tx, &window)
            .await?;
        if reserved > 0 {
            return Err(AppError::WindowHasReservations(reserved));
        }

        let removed = self
            .slot_repo
            .delete_unreserved_in_window(&mut *tx, &window)
            .await?;
        self.availability_repo.delete(&mut *tx, window.id).await?;

        tx.commit().await?;

        tracing::info!(
            "Disponibilidade {} excluída: {} turno(s) livre(s) removido(s)",
            window_id,
            removed
        );
        Ok(removed)
    }

    /// Janelas do próprio veterinário (futuras por padrão).
    pub async fn list_windows(
        &self,
        caller: &User,
        period: WindowPeriod,
        covers_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<AvailabilityWindow>, AppError> {
        if !matches!(caller.role, UserRole::Veterinarian | UserRole::ClinicAdmin) {
            return Err(AppError::Forbidden);
        }
        self.availability_repo
            .list_for_vet(caller.id, period, covers_date, today)
            .await
    }
}
