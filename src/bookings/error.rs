use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::availability::{AvailabilityError, Conflict};
use crate::holds::HoldError;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Venue not found: {0}")]
    VenueNotFound(i32),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Booking conflict: {}", .0.message())]
    Conflict(Conflict),

    #[error("Payment gateway failure: {0}")]
    GatewayFailure(String),

    #[error("The booking could not be finalized due to concurrent activity; please try again")]
    TryAgain,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::DatabaseError(err.to_string())
    }
}

impl From<AvailabilityError> for BookingError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::VenueNotFound(id) => BookingError::VenueNotFound(id),
            AvailabilityError::DatabaseError(msg) => BookingError::DatabaseError(msg),
        }
    }
}

impl From<HoldError> for BookingError {
    fn from(err: HoldError) -> Self {
        match err {
            HoldError::AlreadyHeld { held_until } => {
                BookingError::Conflict(Conflict::Hold { held_until })
            }
            HoldError::VenueNotFound(id) => BookingError::VenueNotFound(id),
            HoldError::NotHeld => {
                BookingError::DatabaseError("Hold was lost before it could be released".to_string())
            }
            HoldError::DatabaseError(msg) => BookingError::DatabaseError(msg),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BookingError::VenueNotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Venue with id {} not found", id) }),
            ),
            BookingError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            BookingError::Conflict(conflict) => (
                StatusCode::CONFLICT,
                json!({
                    "error": conflict.message(),
                    "conflict": conflict,
                }),
            ),
            BookingError::GatewayFailure(msg) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": format!("Payment could not be initiated: {}", msg) }),
            ),
            BookingError::TryAgain => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "The booking could not be finalized due to concurrent activity; please try again" }),
            ),
            BookingError::DatabaseError(msg) => {
                tracing::error!("Database error in booking flow: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "A database error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
