// src/handlers/availability.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::availability_repo::WindowPeriod,
    middleware::auth::AuthenticatedUser,
    models::availability::AvailabilityWindow,
};

// ---
// Payload: criação de disponibilidade
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityPayload {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub daily_time_start: NaiveTime,
    pub daily_time_end: NaiveTime,

    #[validate(range(min = 1, message = "A duração do turno deve ser positiva."))]
    pub slot_duration_minutes: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCreated {
    pub window: AvailabilityWindow,
    pub slots_created: u64,
}

/// Declara uma janela de disponibilidade e gera os turnos dela.
#[utoipa::path(
    post,
    path = "/api/availability",
    request_body = CreateAvailabilityPayload,
    responses(
        (status = 201, description = "Janela criada e turnos gerados", body = AvailabilityCreated),
        (status = 400, description = "Parâmetros inválidos (datas, horários ou fora do expediente)"),
        (status = 403, description = "Só veterinários declaram disponibilidade"),
    ),
    security(("bearer_auth" = [])),
    tag = "availability"
)]
pub async fn create_availability(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateAvailabilityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (window, slots_created) = app_state
        .availability_service
        .create_window(
            &app_state.db_pool,
            &user,
            payload.date_start,
            payload.date_end,
            payload.daily_time_start,
            payload.daily_time_end,
            payload.slot_duration_minutes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AvailabilityCreated {
            window,
            slots_created,
        }),
    ))
}

// ---
// Listagem das janelas do veterinário
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAvailabilityQuery {
    /// `future` (padrão) ou `past`.
    pub filter: Option<WindowPeriod>,
    /// Restringe às janelas que cobrem esta data.
    pub date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/availability",
    params(ListAvailabilityQuery),
    responses(
        (status = 200, description = "Janelas do veterinário autenticado", body = [AvailabilityWindow]),
    ),
    security(("bearer_auth" = [])),
    tag = "availability"
)]
pub async fn list_availability(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let period = query.filter.unwrap_or(WindowPeriod::Future);

    let windows = app_state
        .availability_service
        .list_windows(&user, period, query.date, today)
        .await?;

    Ok((StatusCode::OK, Json(windows)))
}

// ---
// Exclusão (recusada se houver turno reservado no intervalo)
// ---
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDeleted {
    pub slots_removed: u64,
}

#[utoipa::path(
    delete,
    path = "/api/availability/{id}",
    params(("id" = Uuid, Path, description = "ID da janela")),
    responses(
        (status = 200, description = "Janela e turnos livres excluídos", body = AvailabilityDeleted),
        (status = 404, description = "Janela não encontrada"),
        (status = 409, description = "Há turnos reservados no intervalo"),
    ),
    security(("bearer_auth" = [])),
    tag = "availability"
)]
pub async fn delete_availability(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slots_removed = app_state
        .availability_service
        .delete_window(&app_state.db_pool, &user, id)
        .await?;

    Ok((StatusCode::OK, Json(AvailabilityDeleted { slots_removed })))
}
