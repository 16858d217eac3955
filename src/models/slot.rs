// src/models/slot.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{clock, error::AppError};

/// Antecedência mínima (em horas) para o cliente devolver um turno.
pub const CANCELLATION_NOTICE_HOURS: i64 = 2;

// --- Enums ---

/// Ciclo de vida de um turno.
///
/// `Pending → Confirmed → InProgress → Completed`, com os terminais
/// alternativos `Cancelled` e `NoShow`. A devolução pelo cliente volta de
/// `Confirmed` para `Pending`; o cancelamento administrativo é terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "slot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl SlotStatus {
    /// Nome exibido ao usuário.
    pub fn display_name(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "Pendente",
            SlotStatus::Confirmed => "Confirmado",
            SlotStatus::InProgress => "Em atendimento",
            SlotStatus::Completed => "Concluído",
            SlotStatus::Cancelled => "Cancelado",
            SlotStatus::NoShow => "Não compareceu",
        }
    }

    /// Cor usada nos calendários.
    pub fn color(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "#ffc107",
            SlotStatus::Confirmed => "#28a745",
            SlotStatus::InProgress => "#17a2b8",
            SlotStatus::Completed => "#6c757d",
            SlotStatus::Cancelled => "#dc3545",
            SlotStatus::NoShow => "#fd7e14",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SlotStatus::Completed | SlotStatus::Cancelled | SlotStatus::NoShow
        )
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// --- Structs ---

/// Um turno: intervalo reservável de um veterinário em uma data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub veterinarian_id: Uuid,
    pub client_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub duration_minutes: i32,
    pub consultation_type: String,
    pub reason: String,
    pub status: SlotStatus,
    // Cache redundante de "status implica ocupante"; espelha `client_id`.
    pub reserved: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Dois intervalos `[start, end)` se intersectam?
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

impl Slot {
    /// Guarda de reserva: livre e no futuro.
    /// A posse do pet é checada pelo serviço, que tem acesso ao diretório.
    pub fn ensure_claimable(&self, now: NaiveDateTime) -> Result<(), AppError> {
        if self.reserved || self.status != SlotStatus::Pending {
            return Err(AppError::AlreadyReserved);
        }
        if clock::is_past(now, self.date, self.time_start) {
            return Err(AppError::PastSlot);
        }
        Ok(())
    }

    /// Guarda de devolução pelo cliente: antecedência mínima e estado não
    /// terminal de atendimento.
    pub fn ensure_releasable(&self, now: NaiveDateTime) -> Result<(), AppError> {
        if clock::starts_in_less_than(now, self.date, self.time_start, CANCELLATION_NOTICE_HOURS) {
            return Err(AppError::CancellationWindowExpired(CANCELLATION_NOTICE_HOURS));
        }
        if matches!(self.status, SlotStatus::Completed | SlotStatus::InProgress) {
            return Err(AppError::TerminalStateCancellation(self.status));
        }
        if self.status != SlotStatus::Confirmed {
            return Err(AppError::InvalidTransition(self.status));
        }
        Ok(())
    }

    /// Guarda de início de atendimento.
    pub fn ensure_startable(&self) -> Result<(), AppError> {
        if !self.reserved {
            return Err(AppError::NotReserved);
        }
        if self.status != SlotStatus::Confirmed {
            return Err(AppError::InvalidTransition(self.status));
        }
        Ok(())
    }

    /// Guarda de conclusão: direto de `Confirmed` ou após `InProgress`.
    pub fn ensure_completable(&self) -> Result<(), AppError> {
        if !self.reserved {
            return Err(AppError::NotReserved);
        }
        if !matches!(self.status, SlotStatus::Confirmed | SlotStatus::InProgress) {
            return Err(AppError::InvalidTransition(self.status));
        }
        Ok(())
    }

    /// Guarda de "não compareceu".
    pub fn ensure_no_show_markable(&self) -> Result<(), AppError> {
        if !self.reserved {
            return Err(AppError::NotReserved);
        }
        if self.status != SlotStatus::Confirmed {
            return Err(AppError::InvalidTransition(self.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(status: SlotStatus, reserved: bool) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            veterinarian_id: Uuid::new_v4(),
            client_id: reserved.then(Uuid::new_v4),
            pet_id: reserved.then(Uuid::new_v4),
            date: date(2025, 3, 10),
            time_start: time(10, 0),
            time_end: time(10, 30),
            duration_minutes: 30,
            consultation_type: "consulta".to_string(),
            reason: String::new(),
            status,
            reserved,
            created_by: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn overlap_detects_intersection_and_ignores_touching_edges() {
        // 10:00-10:30 contra 10:15-10:45: colidem.
        assert!(intervals_overlap(
            time(10, 0),
            time(10, 30),
            time(10, 15),
            time(10, 45)
        ));
        // Contido: 10:00-11:00 contra 10:15-10:30.
        assert!(intervals_overlap(
            time(10, 0),
            time(11, 0),
            time(10, 15),
            time(10, 30)
        ));
        // Encostados (fim == início) não colidem.
        assert!(!intervals_overlap(
            time(10, 0),
            time(10, 30),
            time(10, 30),
            time(11, 0)
        ));
        assert!(!intervals_overlap(
            time(11, 0),
            time(11, 30),
            time(10, 0),
            time(11, 0)
        ));
    }

    #[test]
    fn claim_requires_unreserved_pending() {
        let now = date(2025, 3, 10).and_time(time(8, 0));

        assert!(slot(SlotStatus::Pending, false).ensure_claimable(now).is_ok());

        let taken = slot(SlotStatus::Confirmed, true);
        assert!(matches!(
            taken.ensure_claimable(now),
            Err(AppError::AlreadyReserved)
        ));
    }

    #[test]
    fn claim_rejects_past_slot() {
        let s = slot(SlotStatus::Pending, false);

        let after_start = date(2025, 3, 10).and_time(time(10, 1));
        assert!(matches!(
            s.ensure_claimable(after_start),
            Err(AppError::PastSlot)
        ));

        let next_day = date(2025, 3, 11).and_time(time(7, 0));
        assert!(matches!(
            s.ensure_claimable(next_day),
            Err(AppError::PastSlot)
        ));
    }

    #[test]
    fn release_respects_cancellation_notice() {
        let s = slot(SlotStatus::Confirmed, true);

        // 4 horas de antecedência: pode devolver.
        let early = date(2025, 3, 10).and_time(time(6, 0));
        assert!(s.ensure_releasable(early).is_ok());

        // 1 hora de antecedência: janela expirada.
        let late = date(2025, 3, 10).and_time(time(9, 0));
        assert!(matches!(
            s.ensure_releasable(late),
            Err(AppError::CancellationWindowExpired(_))
        ));
    }

    #[test]
    fn release_rejects_attended_states() {
        let early = date(2025, 3, 10).and_time(time(6, 0));

        for status in [SlotStatus::InProgress, SlotStatus::Completed] {
            let s = slot(status, true);
            assert!(matches!(
                s.ensure_releasable(early),
                Err(AppError::TerminalStateCancellation(_))
            ));
        }

        let cancelled = slot(SlotStatus::Cancelled, true);
        assert!(matches!(
            cancelled.ensure_releasable(early),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn vet_transitions_require_reservation() {
        let free = slot(SlotStatus::Pending, false);
        assert!(matches!(free.ensure_startable(), Err(AppError::NotReserved)));
        assert!(matches!(
            free.ensure_completable(),
            Err(AppError::NotReserved)
        ));
        assert!(matches!(
            free.ensure_no_show_markable(),
            Err(AppError::NotReserved)
        ));
    }

    #[test]
    fn start_only_from_confirmed() {
        assert!(slot(SlotStatus::Confirmed, true).ensure_startable().is_ok());

        let in_progress = slot(SlotStatus::InProgress, true);
        assert!(matches!(
            in_progress.ensure_startable(),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn complete_from_confirmed_or_in_progress() {
        assert!(slot(SlotStatus::Confirmed, true).ensure_completable().is_ok());
        assert!(slot(SlotStatus::InProgress, true)
            .ensure_completable()
            .is_ok());

        let done = slot(SlotStatus::Completed, true);
        assert!(matches!(
            done.ensure_completable(),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn terminal_states_are_flagged() {
        assert!(SlotStatus::Completed.is_terminal());
        assert!(SlotStatus::Cancelled.is_terminal());
        assert!(SlotStatus::NoShow.is_terminal());
        assert!(!SlotStatus::Pending.is_terminal());
        assert!(!SlotStatus::Confirmed.is_terminal());
        assert!(!SlotStatus::InProgress.is_terminal());
    }
}
