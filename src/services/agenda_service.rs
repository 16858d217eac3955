// src/services/agenda_service.rs
//
// Consultas de agenda: oferta de turnos para o cliente, agenda do
// veterinário e da clínica, e os feeds de calendário do frontend.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{slot_repo::AgendaQuery, SlotRepository},
    models::{
        agenda::{AgendaEntry, AgendaSummary, CalendarEvent, ClientSlots},
        directory::{User, UserRole},
        slot::{Slot, SlotStatus},
    },
};

// Paleta fixa usada para distinguir veterinários no calendário da clínica.
const VET_COLORS: [&str; 10] = [
    "#007bff", "#28a745", "#ffc107", "#dc3545", "#6f42c1", "#20c997", "#e83e8c", "#17a2b8",
    "#6610f2", "#fd7e14",
];

/// Separa os turnos do cliente em próximos (ascendente) e passados
/// (descendente), como a tela "meus turnos" exibe.
fn split_upcoming_past(entries: Vec<AgendaEntry>, today: NaiveDate) -> ClientSlots {
    let (upcoming, mut past): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.slot.date >= today);
    past.reverse();
    ClientSlots { upcoming, past }
}

/// Eventos do calendário da clínica, com uma cor estável por veterinário.
fn clinic_events_from(entries: &[AgendaEntry]) -> Vec<CalendarEvent> {
    let mut colors: HashMap<Uuid, &str> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            let vet = entry.slot.veterinarian_id;
            if !colors.contains_key(&vet) {
                let color = VET_COLORS[colors.len() % VET_COLORS.len()];
                colors.insert(vet, color);
            }
            CalendarEvent::for_clinic(entry, colors[&vet])
        })
        .collect()
}

#[derive(Clone)]
pub struct AgendaService {
    slot_repo: SlotRepository,
}

impl AgendaService {
    pub fn new(slot_repo: SlotRepository) -> Self {
        Self { slot_repo }
    }

    /// Turnos livres e futuros da clínica do cliente.
    pub async fn open_slots(
        &self,
        client: &User,
        veterinarian_id: Option<Uuid>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<Slot>, AppError> {
        if client.role != UserRole::Client {
            return Err(AppError::Forbidden);
        }
        let clinic_id = client.clinic_id.ok_or(AppError::ClinicNotFound)?;
        self.slot_repo
            .list_open(clinic_id, veterinarian_id, date, today)
            .await
    }

    /// Datas que ainda têm turno livre (para o filtro da tela de reserva).
    pub async fn open_dates(
        &self,
        client: &User,
        veterinarian_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AppError> {
        if client.role != UserRole::Client {
            return Err(AppError::Forbidden);
        }
        let clinic_id = client.clinic_id.ok_or(AppError::ClinicNotFound)?;
        self.slot_repo
            .open_dates(clinic_id, veterinarian_id, today)
            .await
    }

    /// Turnos do cliente, separados em próximos e passados.
    pub async fn client_slots(
        &self,
        client: &User,
        today: NaiveDate,
    ) -> Result<ClientSlots, AppError> {
        if client.role != UserRole::Client {
            return Err(AppError::Forbidden);
        }
        let entries = self
            .slot_repo
            .list_agenda(&AgendaQuery {
                client_id: Some(client.id),
                ..Default::default()
            })
            .await?;
        Ok(split_upcoming_past(entries, today))
    }

    /// Agenda do veterinário: só turnos reservados, de hoje em diante,
    /// com o total do dia.
    pub async fn vet_agenda(
        &self,
        veterinarian: &User,
        today: NaiveDate,
    ) -> Result<AgendaSummary, AppError> {
        if veterinarian.role != UserRole::Veterinarian {
            return Err(AppError::Forbidden);
        }
        let entries = self
            .slot_repo
            .list_agenda(&AgendaQuery {
                veterinarian_id: Some(veterinarian.id),
                reserved_only: true,
                date_from: Some(today),
                ..Default::default()
            })
            .await?;
        let total_today = entries.iter().filter(|e| e.slot.date == today).count();
        Ok(AgendaSummary {
            total_today,
            entries,
        })
    }

    /// Feed de calendário do veterinário (cor pelo estado do turno).
    pub async fn vet_events(&self, veterinarian: &User) -> Result<Vec<CalendarEvent>, AppError> {
        if veterinarian.role != UserRole::Veterinarian {
            return Err(AppError::Forbidden);
        }
        let entries = self
            .slot_repo
            .list_agenda(&AgendaQuery {
                veterinarian_id: Some(veterinarian.id),
                reserved_only: true,
                ..Default::default()
            })
            .await?;
        Ok(entries.iter().map(CalendarEvent::for_vet).collect())
    }

    /// Agenda completa da clínica (admin): reservados de hoje em diante.
    pub async fn clinic_agenda(
        &self,
        admin: &User,
        veterinarian_id: Option<Uuid>,
        status: Option<SlotStatus>,
        today: NaiveDate,
    ) -> Result<Vec<AgendaEntry>, AppError> {
        if admin.role != UserRole::ClinicAdmin {
            return Err(AppError::Forbidden);
        }
        let clinic_id = admin.clinic_id.ok_or(AppError::ClinicNotFound)?;
        self.slot_repo
            .list_agenda(&AgendaQuery {
                clinic_id: Some(clinic_id),
                veterinarian_id,
                status,
                reserved_only: true,
                date_from: Some(today),
                ..Default::default()
            })
            .await
    }

    /// Feed de calendário da clínica (admin), uma cor por veterinário.
    pub async fn clinic_events(
        &self,
        admin: &User,
        veterinarian_id: Option<Uuid>,
        status: Option<SlotStatus>,
        today: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let entries = self
            .clinic_agenda(admin, veterinarian_id, status, today)
            .await?;
        Ok(clinic_events_from(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(vet_id: Uuid, d: NaiveDate) -> AgendaEntry {
        let time_start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        AgendaEntry {
            slot: Slot {
                id: Uuid::new_v4(),
                clinic_id: Uuid::new_v4(),
                veterinarian_id: vet_id,
                client_id: Some(Uuid::new_v4()),
                pet_id: Some(Uuid::new_v4()),
                date: d,
                time_start,
                time_end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
                duration_minutes: 30,
                consultation_type: "consulta".to_string(),
                reason: String::new(),
                status: SlotStatus::Confirmed,
                reserved: true,
                created_by: None,
                created_at: DateTime::<Utc>::MIN_UTC,
            },
            veterinarian_name: "Dra. Ana".to_string(),
            client_name: Some("Carlos".to_string()),
            pet_name: Some("Rex".to_string()),
        }
    }

    #[test]
    fn splits_client_slots_around_today() {
        let vet = Uuid::new_v4();
        let today = date(2025, 3, 10);
        let entries = vec![
            entry(vet, date(2025, 3, 8)),
            entry(vet, date(2025, 3, 9)),
            entry(vet, date(2025, 3, 10)),
            entry(vet, date(2025, 3, 12)),
        ];

        let split = split_upcoming_past(entries, today);

        assert_eq!(split.upcoming.len(), 2);
        assert_eq!(split.upcoming[0].slot.date, date(2025, 3, 10));
        // Passados vêm do mais recente para o mais antigo.
        assert_eq!(split.past.len(), 2);
        assert_eq!(split.past[0].slot.date, date(2025, 3, 9));
        assert_eq!(split.past[1].slot.date, date(2025, 3, 8));
    }

    #[test]
    fn clinic_events_reuse_one_color_per_vet() {
        let vet_a = Uuid::new_v4();
        let vet_b = Uuid::new_v4();
        let d = date(2025, 3, 10);
        let entries = vec![
            entry(vet_a, d),
            entry(vet_b, d),
            entry(vet_a, d),
        ];

        let events = clinic_events_from(&entries);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].color, events[2].color);
        assert_ne!(events[0].color, events[1].color);
        assert_eq!(events[0].color, VET_COLORS[0]);
        assert_eq!(events[1].color, VET_COLORS[1]);
    }

    #[test]
    fn vet_event_carries_status_color_and_names() {
        let e = entry(Uuid::new_v4(), date(2025, 3, 10));
        let event = CalendarEvent::for_vet(&e);

        assert_eq!(event.title, "Rex - Carlos");
        assert_eq!(event.color, SlotStatus::Confirmed.color());
        assert_eq!(event.extended_props.veterinarian, "Dra. Ana");
        assert!(event.extended_props.reserved);
    }
}
