use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;

/// Error types for hold operations
#[derive(Debug, thiserror::Error)]
pub enum HoldError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Venue not found: {0}")]
    VenueNotFound(i32),

    #[error("Venue is currently on hold by another user until {held_until}")]
    AlreadyHeld { held_until: DateTime<Utc> },

    #[error("No active hold owned by this requester")]
    NotHeld,
}

impl From<sqlx::Error> for HoldError {
    fn from(err: sqlx::Error) -> Self {
        HoldError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for HoldError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            HoldError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            HoldError::VenueNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Venue with id {} not found", id),
            ),
            HoldError::AlreadyHeld { held_until } => (
                StatusCode::CONFLICT,
                format!(
                    "Venue is currently on hold by another user until {}",
                    held_until.format("%Y-%m-%d %H:%M:%S UTC")
                ),
            ),
            HoldError::NotHeld => (
                StatusCode::CONFLICT,
                "No active hold owned by this requester".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
