use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use crate::venues::{MaintenanceWindow, Reservation, Venue};

const VENUE_COLUMNS: &str = "id, name, kind, is_active, is_out_of_service, is_reserved, \
     min_guests, max_guests, price, on_hold, hold_expiry, hold_by";

/// Read-only repository over the venue catalog and its admin-managed records
///
/// The catalog itself is maintained by external CRUD; this engine only reads
/// it (the scheduler mutates status flags through its own bulk updates).
#[derive(Clone)]
pub struct VenueRepository {
    pool: PgPool,
}

impl VenueRepository {
    /// Create a new VenueRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a venue by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Venue>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        find_venue(&mut *conn, id).await
    }

    /// All venues, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Venue>, sqlx::Error> {
        sqlx::query_as::<_, Venue>(&format!(
            "SELECT {} FROM venues ORDER BY id",
            VENUE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

}

/// Fetch a venue row with any connection, including a transaction
///
/// Free functions so the booking finalizer can re-load inside its own
/// transaction with `&mut *tx`.
pub async fn find_venue(conn: &mut PgConnection, id: i32) -> Result<Option<Venue>, sqlx::Error> {
    sqlx::query_as::<_, Venue>(&format!(
        "SELECT {} FROM venues WHERE id = $1",
        VENUE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn find_maintenance_windows(
    conn: &mut PgConnection,
    venue_id: i32,
) -> Result<Vec<MaintenanceWindow>, sqlx::Error> {
    sqlx::query_as::<_, MaintenanceWindow>(
        r#"
        SELECT id, venue_id, start_date, end_date, reason
        FROM maintenance_windows
        WHERE venue_id = $1
        ORDER BY start_date
        "#,
    )
    .bind(venue_id)
    .fetch_all(conn)
    .await
}

pub async fn find_reservations_from(
    conn: &mut PgConnection,
    venue_id: i32,
    date: NaiveDate,
) -> Result<Vec<Reservation>, sqlx::Error> {
    sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, venue_id, reserved_from, reserved_to, time_slot, reserved_by
        FROM reservations
        WHERE venue_id = $1 AND reserved_to > $2
        ORDER BY reserved_from
        "#,
    )
    .bind(venue_id)
    .bind(date)
    .fetch_all(conn)
    .await
}
