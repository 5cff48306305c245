//! error.rs
//!
//! Ошибки движка и их отображение в HTTP-ответы.
//!
//! Все ошибки `EngineError` восстановимы: слой представления показывает сообщение
//! и предлагает повторить ввод, процесс при этом не падает.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Ошибки доменного слоя (места, шоу, акции, бронирования).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("seat {0} is not available")]
    SeatUnavailable(String),

    #[error("only {available} seats match the criteria, {requested} requested")]
    InsufficientSeats { requested: u32, available: usize },

    #[error("permission denied: {0}")]
    Permission(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound { entity, id: id.to_string() }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        EngineError::Permission(message.into())
    }
}

/// Ошибки уровня приложения: доменные плюс аутентификация и внутренние сбои.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

// Тот же код, что и для конфликтов мест в API бронирования
fn status_419() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::CONFLICT)
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(EngineError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Engine(EngineError::SeatUnavailable(_)) => status_419(),
            AppError::Engine(EngineError::InsufficientSeats { .. }) => StatusCode::CONFLICT,
            AppError::Engine(EngineError::Permission(_)) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
            other => {
                tracing::debug!("Request rejected with {}: {}", status, other);
                other.to_string()
            }
        };

        (status, Json(ApiError { success: false, message })).into_response()
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
