/// Error types for availability checks
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Venue not found: {0}")]
    VenueNotFound(i32),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AvailabilityError {
    fn from(err: sqlx::Error) -> Self {
        AvailabilityError::DatabaseError(err.to_string())
    }
}
