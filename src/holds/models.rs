use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An active exclusive claim on a venue
///
/// At most one active hold exists per venue; the claim lives on the venue row
/// itself (`on_hold`, `hold_expiry`, `hold_by`), which is what makes the
/// acquire a single-row compare-and-swap.
#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct Hold {
    pub venue_id: i32,
    pub hold_expiry: DateTime<Utc>,
    pub hold_by: String,
}

impl Hold {
    /// Whether this hold is still live at the given instant
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.hold_expiry > now
    }
}
