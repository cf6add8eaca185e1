use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use crate::domain::models::slot::SlotIdError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),
    #[error("Contact method is required")]
    MissingContactMethod,
    #[error("Verification failed")]
    VerificationFailed,
    #[error("No volunteer available")]
    NoVolunteerAvailable,
    #[error("No youth volunteers available")]
    NoYouthVolunteerAvailable,
    #[error("Document changed since it was read")]
    StoreConflict,
    #[error("Too many requests")]
    RateLimited,
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Machine-readable booking failure code, for the variants the booking
    /// form distinguishes.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AppError::InvalidSlot(_) => Some("invalid-slot"),
            AppError::MissingContactMethod => Some("missing-contact-method"),
            AppError::VerificationFailed => Some("verification-failed"),
            AppError::NoVolunteerAvailable | AppError::NoYouthVolunteerAvailable => {
                Some("no-volunteer-available")
            }
            _ => None,
        }
    }
}

impl From<SlotIdError> for AppError {
    fn from(e: SlotIdError) -> Self {
        AppError::InvalidSlot(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidSlot(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingContactMethod => {
                (StatusCode::BAD_REQUEST, "Please choose phone, video or chat".to_string())
            }
            AppError::VerificationFailed => {
                (StatusCode::FORBIDDEN, "Request could not be verified".to_string())
            }
            AppError::NoVolunteerAvailable => (
                StatusCode::CONFLICT,
                "No volunteer is available for this time. Please pick another time.".to_string(),
            ),
            AppError::NoYouthVolunteerAvailable => (
                StatusCode::CONFLICT,
                "No youth volunteers available for this time. Please pick another time.".to_string(),
            ),
            AppError::StoreConflict => {
                warn!("Store conflict reached the response layer");
                (StatusCode::CONFLICT, "The data changed while saving. Please try again.".to_string())
            }
            AppError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests, slow down".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = match self.reason() {
            Some(reason) => json!({ "error": message, "reason": reason }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
