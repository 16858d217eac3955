// src/handlers/agenda.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        agenda::{AgendaEntry, AgendaSummary, CalendarEvent, ClientSlots},
        slot::{Slot, SlotStatus},
    },
};

// ---
// Cliente: oferta de turnos
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlotsQuery {
    /// Filtra por veterinário.
    pub vet_id: Option<Uuid>,
    /// Filtra por uma data específica (senão, de hoje em diante).
    pub date: Option<NaiveDate>,
}

/// Turnos livres da clínica do cliente, ordenados por data e hora.
#[utoipa::path(
    get,
    path = "/api/slots/open",
    params(OpenSlotsQuery),
    responses(
        (status = 200, description = "Turnos disponíveis para reserva", body = [Slot]),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn open_slots(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let slots = app_state
        .agenda_service
        .open_slots(&user, query.vet_id, query.date, today)
        .await?;

    Ok((StatusCode::OK, Json(slots)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OpenDatesQuery {
    pub vet_id: Option<Uuid>,
}

/// Datas que ainda têm turno livre (alimenta o filtro de datas).
#[utoipa::path(
    get,
    path = "/api/slots/open/dates",
    params(OpenDatesQuery),
    responses(
        (status = 200, description = "Datas com turnos disponíveis", body = [NaiveDate]),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn open_dates(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<OpenDatesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let dates = app_state
        .agenda_service
        .open_dates(&user, query.vet_id, today)
        .await?;

    Ok((StatusCode::OK, Json(dates)))
}

/// Turnos do próprio cliente, separados em próximos e passados.
#[utoipa::path(
    get,
    path = "/api/slots/mine",
    responses(
        (status = 200, description = "Turnos do cliente", body = ClientSlots),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn my_slots(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let slots = app_state.agenda_service.client_slots(&user, today).await?;

    Ok((StatusCode::OK, Json(slots)))
}

// ---
// Veterinário: agenda
// ---

/// Agenda do veterinário: reservados de hoje em diante + total do dia.
#[utoipa::path(
    get,
    path = "/api/agenda",
    responses(
        (status = 200, description = "Agenda do veterinário", body = AgendaSummary),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn vet_agenda(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let agenda = app_state.agenda_service.vet_agenda(&user, today).await?;

    Ok((StatusCode::OK, Json(agenda)))
}

/// Feed de calendário do veterinário.
#[utoipa::path(
    get,
    path = "/api/agenda/events",
    responses(
        (status = 200, description = "Eventos do calendário", body = [CalendarEvent]),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn vet_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let events = app_state.agenda_service.vet_events(&user).await?;

    Ok((StatusCode::OK, Json(events)))
}

// ---
// Administração: agenda da clínica
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClinicAgendaQuery {
    pub vet_id: Option<Uuid>,
    pub status: Option<SlotStatus>,
}

/// Agenda completa da clínica (reservados de hoje em diante).
#[utoipa::path(
    get,
    path = "/api/clinic/agenda",
    params(ClinicAgendaQuery),
    responses(
        (status = 200, description = "Agenda da clínica", body = [AgendaEntry]),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn clinic_agenda(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ClinicAgendaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let entries = app_state
        .agenda_service
        .clinic_agenda(&user, query.vet_id, query.status, today)
        .await?;

    Ok((StatusCode::OK, Json(entries)))
}

/// Feed de calendário da clínica, uma cor por veterinário.
#[utoipa::path(
    get,
    path = "/api/clinic/agenda/events",
    params(ClinicAgendaQuery),
    responses(
        (status = 200, description = "Eventos do calendário da clínica", body = [CalendarEvent]),
    ),
    security(("bearer_auth" = [])),
    tag = "agenda"
)]
pub async fn clinic_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ClinicAgendaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let events = app_state
        .agenda_service
        .clinic_events(&user, query.vet_id, query.status, today)
        .await?;

    Ok((StatusCode::OK, Json(events)))
}
