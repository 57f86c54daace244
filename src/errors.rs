use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Message shown to clients whenever an order could not be written.
pub const ORDER_FAILED_MESSAGE: &str = "Error creating order, please try again later";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Order failed: {0}")]
    OrderFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::UnknownUser(_) => AppError::OrderFailed(e.to_string()),
            DomainError::InvalidOrderInput(_) | DomainError::ProductResolutionGap(_) => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            DomainError::TransactionFailure(msg) => AppError::OrderFailed(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": msg
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
                "error": msg
            })),
            AppError::OrderFailed(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": ORDER_FAILED_MESSAGE
                }))
            }
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}
