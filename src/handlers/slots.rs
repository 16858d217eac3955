// src/handlers/slots.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::slot::Slot,
    services::booking_service::{CancelOutcome, ManualSlotParams},
};

// ---
// Payload: reservar turno
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSlotPayload {
    #[validate(required(message = "O campo 'petId' é obrigatório."))]
    pub pet_id: Option<Uuid>,

    #[validate(length(max = 500, message = "O motivo pode ter no máximo 500 caracteres."))]
    pub reason: Option<String>,
}

/// Cliente reserva um turno livre para um pet dele.
#[utoipa::path(
    post,
    path = "/api/slots/{id}/claim",
    params(("id" = Uuid, Path, description = "ID do turno")),
    request_body = ClaimSlotPayload,
    responses(
        (status = 200, description = "Turno reservado", body = Slot),
        (status = 404, description = "Turno não encontrado"),
        (status = 409, description = "Turno já reservado por outro cliente"),
        (status = 422, description = "Turno no passado ou pet de outro dono"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn claim_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClaimSlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let now = Local::now().naive_local();
    let slot = app_state
        .booking_service
        .claim_slot(
            &app_state.db_pool,
            &user,
            id,
            payload.pet_id.unwrap(),
            payload.reason.as_deref(),
            now,
        )
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

/// Cliente devolve um turno reservado (volta a ficar disponível).
#[utoipa::path(
    post,
    path = "/api/slots/{id}/release",
    params(("id" = Uuid, Path, description = "ID do turno")),
    responses(
        (status = 200, description = "Turno devolvido", body = Slot),
        (status = 404, description = "Turno não encontrado"),
        (status = 422, description = "Fora da janela de cancelamento ou atendimento já iniciado"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn release_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let now = Local::now().naive_local();
    let slot = app_state
        .booking_service
        .release_slot(&app_state.db_pool, &user, id, now)
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

/// Veterinário inicia o atendimento.
#[utoipa::path(
    post,
    path = "/api/slots/{id}/start",
    params(("id" = Uuid, Path, description = "ID do turno")),
    responses(
        (status = 200, description = "Atendimento iniciado", body = Slot),
        (status = 422, description = "Turno não reservado ou em estado inválido"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn start_attention(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = app_state
        .booking_service
        .start_attention(&app_state.db_pool, &user, id)
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

/// Veterinário conclui o atendimento.
#[utoipa::path(
    post,
    path = "/api/slots/{id}/complete",
    params(("id" = Uuid, Path, description = "ID do turno")),
    responses(
        (status = 200, description = "Turno concluído", body = Slot),
        (status = 422, description = "Turno não reservado ou em estado inválido"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn complete_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = app_state
        .booking_service
        .complete_slot(&app_state.db_pool, &user, id)
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

/// Veterinário registra que o cliente não compareceu.
#[utoipa::path(
    post,
    path = "/api/slots/{id}/no-show",
    params(("id" = Uuid, Path, description = "ID do turno")),
    responses(
        (status = 200, description = "Falta registrada", body = Slot),
        (status = 422, description = "Turno não reservado ou em estado inválido"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn mark_no_show(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let slot = app_state
        .booking_service
        .mark_no_show(&app_state.db_pool, &user, id)
        .await?;

    Ok((StatusCode::OK, Json(slot)))
}

// ---
// Payload: cancelamento administrativo
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCancelPayload {
    #[validate(length(max = 500, message = "O motivo pode ter no máximo 500 caracteres."))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCancelResponse {
    pub deleted: bool,
    pub slot: Option<Slot>,
}

/// Administração cancela um turno da clínica: reservado vira `cancelled`
/// (terminal); livre é apagado.
#[utoipa::path(
    post,
    path = "/api/slots/{id}/cancel",
    params(("id" = Uuid, Path, description = "ID do turno")),
    request_body = AdminCancelPayload,
    responses(
        (status = 200, description = "Turno cancelado ou excluído", body = AdminCancelResponse),
        (status = 403, description = "Turno de outra clínica"),
        (status = 404, description = "Turno não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn admin_cancel_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminCancelPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reason = payload
        .reason
        .unwrap_or_else(|| "Cancelado pela administração".to_string());

    let outcome = app_state
        .booking_service
        .admin_cancel(&app_state.db_pool, &user, id, &reason)
        .await?;

    let response = match outcome {
        CancelOutcome::Cancelled(slot) => AdminCancelResponse {
            deleted: false,
            slot: Some(slot),
        },
        CancelOutcome::Deleted => AdminCancelResponse {
            deleted: true,
            slot: None,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

// ---
// Payload: turno manual (admin)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualSlotPayload {
    #[validate(required(message = "O campo 'veterinarianId' é obrigatório."))]
    pub veterinarian_id: Option<Uuid>,

    #[validate(required(message = "O campo 'clientId' é obrigatório."))]
    pub client_id: Option<Uuid>,

    #[validate(required(message = "O campo 'petId' é obrigatório."))]
    pub pet_id: Option<Uuid>,

    pub date: NaiveDate,
    pub time_start: NaiveTime,

    #[validate(range(min = 15, max = 120, message = "A duração deve ficar entre 15 e 120 minutos."))]
    pub duration_minutes: i32,

    pub consultation_type: Option<String>,

    #[validate(length(max = 500, message = "O motivo pode ter no máximo 500 caracteres."))]
    pub reason: Option<String>,
}

/// Administração cria um turno já reservado para um cliente da clínica.
/// Passa pela mesma validação de sobreposição dos turnos gerados.
#[utoipa::path(
    post,
    path = "/api/slots",
    request_body = CreateManualSlotPayload,
    responses(
        (status = 201, description = "Turno criado e reservado", body = Slot),
        (status = 400, description = "Participantes inválidos"),
        (status = 409, description = "Sobrepõe um turno existente do veterinário"),
    ),
    security(("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn create_manual_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateManualSlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let slot = app_state
        .booking_service
        .create_manual_slot(
            &app_state.db_pool,
            &user,
            ManualSlotParams {
                veterinarian_id: payload.veterinarian_id.unwrap(),
                client_id: payload.client_id.unwrap(),
                pet_id: payload.pet_id.unwrap(),
                date: payload.date,
                time_start: payload.time_start,
                duration_minutes: payload.duration_minutes,
                consultation_type: payload.consultation_type,
                reason: payload.reason.unwrap_or_default(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}
