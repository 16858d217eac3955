// src/models/agenda.rs

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::slot::Slot;
use crate::common::clock;

/// Turno enriquecido com os nomes que as agendas exibem.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub slot: Slot,
    pub veterinarian_name: String,
    pub client_name: Option<String>,
    pub pet_name: Option<String>,
}

/// Agenda do veterinário com o resumo do dia.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaSummary {
    pub total_today: usize,
    pub entries: Vec<AgendaEntry>,
}

/// Turnos do cliente separados em próximos e passados.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSlots {
    pub upcoming: Vec<AgendaEntry>,
    pub past: Vec<AgendaEntry>,
}

/// Evento no formato que os calendários do frontend consomem.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: uuid::Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color: String,
    pub extended_props: CalendarEventProps,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventProps {
    pub status: String,
    pub reserved: bool,
    pub veterinarian: String,
    pub client: String,
    pub pet: String,
}

impl CalendarEvent {
    fn build(entry: &AgendaEntry, title: String, color: String) -> Self {
        let slot = &entry.slot;
        Self {
            id: slot.id,
            title,
            start: clock::combine(slot.date, slot.time_start),
            end: clock::combine(slot.date, slot.time_end),
            color,
            extended_props: CalendarEventProps {
                status: slot.status.display_name().to_string(),
                reserved: slot.reserved,
                veterinarian: entry.veterinarian_name.clone(),
                client: entry.client_name.clone().unwrap_or_default(),
                pet: entry.pet_name.clone().unwrap_or_default(),
            },
        }
    }

    /// Evento da agenda do próprio veterinário: título "pet - cliente",
    /// cor pelo estado do turno.
    pub fn for_vet(entry: &AgendaEntry) -> Self {
        let title = format!(
            "{} - {}",
            entry.pet_name.as_deref().unwrap_or(""),
            entry.client_name.as_deref().unwrap_or("")
        );
        let color = entry.slot.status.color().to_string();
        Self::build(entry, title, color)
    }

    /// Evento da agenda da clínica: título "veterinário - pet", cor fixa
    /// por veterinário (atribuída pelo chamador).
    pub fn for_clinic(entry: &AgendaEntry, color: &str) -> Self {
        let title = format!(
            "{} - {}",
            entry.veterinarian_name,
            entry.pet_name.as_deref().unwrap_or("")
        );
        Self::build(entry, title, color.to_string())
    }
}
