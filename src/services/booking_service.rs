// src/services/booking_service.rs
//
// A máquina de estados de um turno: reservar, devolver, iniciar,
// concluir, marcar falta e cancelar. O `claim` é a única operação
// sensível a concorrência: roda sob lock de linha dentro de uma
// transação, então duas reservas simultâneas se serializam e a perdedora
// recebe `AlreadyReserved`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{clock, error::AppError},
    db::{slot_repo::NewSlot, DirectoryRepository, SlotRepository},
    models::{
        directory::{User, UserRole},
        slot::{Slot, SlotStatus},
    },
};

/// Dados do turno manual criado pela administração (já reservado).
#[derive(Debug)]
pub struct ManualSlotParams {
    pub veterinarian_id: Uuid,
    pub client_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub duration_minutes: i32,
    pub consultation_type: Option<String>,
    pub reason: String,
}

/// Resultado do cancelamento administrativo: turno reservado vira
/// `Cancelled`; turno livre é simplesmente apagado.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Slot),
    Deleted,
}

#[derive(Clone)]
pub struct BookingService {
    slot_repo: SlotRepository,
    directory_repo: DirectoryRepository,
}

impl BookingService {
    pub fn new(slot_repo: SlotRepository, directory_repo: DirectoryRepository) -> Self {
        Self {
            slot_repo,
            directory_repo,
        }
    }

    /// Reserva um turno para o cliente e um pet dele.
    ///
    /// O lock (`SELECT ... FOR UPDATE`) vem antes de qualquer leitura do
    /// estado do turno; o UPDATE condicional em `claim` é a segunda
    /// barreira: se o predicado "livre" não casar mais, ninguém escreve.
    pub async fn claim_slot<'e, E>(
        &self,
        executor: E,
        client: &User,
        slot_id: Uuid,
        pet_id: Uuid,
        reason: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if client.role != UserRole::Client {
            return Err(AppError::Forbidden);
        }

        // Posse do pet checada antes de travar a linha do turno.
        let pet = self
            .directory_repo
            .find_active_pet(pet_id)
            .await?
            .ok_or(AppError::PetNotFound)?;
        if pet.owner_id != client.id {
            return Err(AppError::PetOwnershipMismatch);
        }

        let mut tx = executor.begin().await?;

        let slot = self
            .slot_repo
            .get_for_update(&mut *tx, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        if client.clinic_id != Some(slot.clinic_id) {
            return Err(AppError::Forbidden);
        }
        slot.ensure_claimable(now)?;

        let claimed = self
            .slot_repo
            .claim(&mut *tx, slot.id, client.id, pet.id, reason)
            .await?
            .ok_or(AppError::AlreadyReserved)?;

        tx.commit().await?;

        tracing::info!(
            "Turno {} reservado pelo cliente {} (pet {})",
            claimed.id,
            client.id,
            pet.id
        );
        Ok(claimed)
    }

    /// Devolve um turno reservado: volta a `Pending` e fica disponível de
    /// novo. Exige antecedência mínima e que o atendimento não tenha
    /// começado.
    pub async fn release_slot<'e, E>(
        &self,
        executor: E,
        client: &User,
        slot_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let slot = self
            .slot_repo
            .get_for_update(&mut *tx, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        if slot.client_id != Some(client.id) {
            return Err(AppError::Forbidden);
        }
        slot.ensure_releasable(now)?;

        let released = self.slot_repo.release(&mut *tx, slot.id).await?;

        tx.commit().await?;

        tracing::info!("Turno {} devolvido pelo cliente {}", slot_id, client.id);
        Ok(released)
    }

    /// Veterinário inicia o atendimento: `Confirmed → InProgress`.
    pub async fn start_attention<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        slot_id: Uuid,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.vet_transition(executor, veterinarian, slot_id, SlotStatus::InProgress)
            .await
    }

    /// Veterinário conclui o atendimento: `Confirmed`/`InProgress → Completed`.
    pub async fn complete_slot<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        slot_id: Uuid,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.vet_transition(executor, veterinarian, slot_id, SlotStatus::Completed)
            .await
    }

    /// Cliente não veio: `Confirmed → NoShow`.
    pub async fn mark_no_show<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        slot_id: Uuid,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.vet_transition(executor, veterinarian, slot_id, SlotStatus::NoShow)
            .await
    }

    async fn vet_transition<'e, E>(
        &self,
        executor: E,
        veterinarian: &User,
        slot_id: Uuid,
        target: SlotStatus,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if veterinarian.role != UserRole::Veterinarian {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let slot = self
            .slot_repo
            .get_for_update(&mut *tx, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        if slot.veterinarian_id != veterinarian.id {
            return Err(AppError::Forbidden);
        }
        match target {
            SlotStatus::InProgress => slot.ensure_startable()?,
            SlotStatus::Completed => slot.ensure_completable()?,
            SlotStatus::NoShow => slot.ensure_no_show_markable()?,
            other => return Err(AppError::InvalidTransition(other)),
        }

        let updated = self.slot_repo.set_status(&mut *tx, slot.id, target).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Cancelamento administrativo, restrito à clínica do turno.
    /// Reservado e confirmado vira `Cancelled` (terminal, não volta para a
    /// oferta); livre é apagado.
    pub async fn admin_cancel<'e, E>(
        &self,
        executor: E,
        admin: &User,
        slot_id: Uuid,
        reason: &str,
    ) -> Result<CancelOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if admin.role != UserRole::ClinicAdmin {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let slot = self
            .slot_repo
            .get_for_update(&mut *tx, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        if admin.clinic_id != Some(slot.clinic_id) {
            return Err(AppError::Forbidden);
        }

        let outcome = if slot.reserved {
            if slot.status != SlotStatus::Confirmed {
                return Err(AppError::InvalidTransition(slot.status));
            }
            let cancelled = self.slot_repo.cancel(&mut *tx, slot.id, reason).await?;
            CancelOutcome::Cancelled(cancelled)
        } else {
            if slot.status != SlotStatus::Pending {
                return Err(AppError::InvalidTransition(slot.status));
            }
            self.slot_repo.delete(&mut *tx, slot.id).await?;
            CancelOutcome::Deleted
        };

        tx.commit().await?;

        tracing::info!("Turno {} cancelado pela administração", slot_id);
        Ok(outcome)
    }

    /// Turno manual criado pela administração, já reservado para um
    /// cliente da clínica. Passa pela mesma checagem de sobreposição da
    /// geração.
    pub async fn create_manual_slot<'e, E>(
        &self,
        executor: E,
        admin: &User,
        params: ManualSlotParams,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if admin.role != UserRole::ClinicAdmin {
            return Err(AppError::Forbidden);
        }
        let clinic_id = admin.clinic_id.ok_or(AppError::ClinicNotFound)?;

        // O veterinário precisa ser da clínica do turno (checado na
        // criação; não é revalidado depois).
        let vet = self
            .directory_repo
            .find_user_by_id(params.veterinarian_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        if vet.role != UserRole::Veterinarian || !vet.is_active {
            return Err(AppError::UserNotFound);
        }
        if vet.clinic_id != Some(clinic_id) {
            return Err(AppError::VetNotInClinic);
        }

        let client = self
            .directory_repo
            .find_user_by_id(params.client_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        if client.role != UserRole::Client
            || !client.is_active
            || client.clinic_id != Some(clinic_id)
        {
            return Err(AppError::UserNotFound);
        }

        let pet = self
            .directory_repo
            .find_active_pet(params.pet_id)
            .await?
            .ok_or(AppError::PetNotFound)?;
        if pet.owner_id != client.id {
            return Err(AppError::PetOwnershipMismatch);
        }

        let time_end = clock::end_time(params.time_start, params.duration_minutes);

        let mut tx = executor.begin().await?;

        if self
            .slot_repo
            .has_overlap(
                &mut *tx,
                vet.id,
                params.date,
                params.time_start,
                time_end,
            )
            .await?
        {
            return Err(AppError::SlotOverlap);
        }

        let slot = self
            .slot_repo
            .insert(
                &mut *tx,
                &NewSlot {
                    clinic_id,
                    veterinarian_id: vet.id,
                    client_id: Some(client.id),
                    pet_id: Some(pet.id),
                    date: params.date,
                    time_start: params.time_start,
                    time_end,
                    duration_minutes: params.duration_minutes,
                    consultation_type: params.consultation_type.as_deref().unwrap_or("consulta"),
                    reason: &params.reason,
                    status: SlotStatus::Confirmed,
                    reserved: true,
                    created_by: Some(admin.id),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Turno manual {} criado para o cliente {} com o veterinário {}",
            slot.id,
            client.id,
            vet.id
        );
        Ok(slot)
    }
}
