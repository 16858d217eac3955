use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveTime;
use serde_json::json;
use thiserror::Error;

use crate::models::slot::SlotStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Disponibilidade ---
    #[error("O horário está fora do horário de atendimento da clínica ({open} - {close})")]
    OutsideClinicHours { open: NaiveTime, close: NaiveTime },

    #[error("A data de fim não pode ser anterior à data de início")]
    InvalidDateRange,

    #[error("A hora de fim deve ser posterior à hora de início")]
    InvalidTimeRange,

    #[error("Não é possível excluir: há {0} turno(s) já reservado(s) neste intervalo")]
    WindowHasReservations(i64),

    #[error("Disponibilidade não encontrada")]
    WindowNotFound,

    // --- Turnos ---
    #[error("O turno já foi reservado por outro cliente")]
    AlreadyReserved,

    #[error("O horário do turno já passou")]
    PastSlot,

    #[error("O pet não pertence ao cliente")]
    PetOwnershipMismatch,

    #[error("Não é possível cancelar com menos de {0} horas de antecedência")]
    CancellationWindowExpired(i64),

    #[error("Não é possível cancelar um turno em estado '{0}'")]
    TerminalStateCancellation(SlotStatus),

    #[error("Operação inválida para um turno em estado '{0}'")]
    InvalidTransition(SlotStatus),

    #[error("O turno não está reservado")]
    NotReserved,

    #[error("O turno se sobrepõe a outro existente para o veterinário")]
    SlotOverlap,

    #[error("Turno não encontrado")]
    SlotNotFound,

    // --- Diretório ---
    #[error("Pet não encontrado")]
    PetNotFound,

    #[error("Clínica não encontrada")]
    ClinicNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("O veterinário não pertence à clínica")]
    VetNotInClinic,

    // --- Auth ---
    #[error("Acesso negado")]
    Forbidden,

    #[error("Token de autenticação inválido ou ausente")]
    InvalidToken,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Parâmetros malformados: recuperável corrigindo a entrada.
            AppError::OutsideClinicHours { .. }
            | AppError::InvalidDateRange
            | AppError::InvalidTimeRange
            | AppError::VetNotInClinic => StatusCode::BAD_REQUEST,

            // Conflitos: o chamador deve recarregar e tentar de novo.
            AppError::AlreadyReserved
            | AppError::SlotOverlap
            | AppError::WindowHasReservations(_) => StatusCode::CONFLICT,

            // Pré-condições não atendidas: não adianta repetir a chamada.
            AppError::PastSlot
            | AppError::PetOwnershipMismatch
            | AppError::CancellationWindowExpired(_)
            | AppError::TerminalStateCancellation(_)
            | AppError::InvalidTransition(_)
            | AppError::NotReserved => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::SlotNotFound
            | AppError::WindowNotFound
            | AppError::PetNotFound
            | AppError::ClinicNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,

            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                let body = Json(json!({ "error": "Ocorreu um erro inesperado." }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
