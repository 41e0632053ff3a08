use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::bookings::models::Booking;
use crate::bookings::repository as bookings_repo;
use crate::venues::repository as venues_repo;
use crate::venues::{MaintenanceWindow, Reservation, Venue};

/// Consistent view of everything the checker needs for one venue
///
/// Loaded through a single connection so the booking finalizer can re-load it
/// inside its own transaction (`&mut *tx`) and evaluate against the state it
/// is about to commit over.
#[derive(Debug, Clone)]
pub struct AvailabilitySnapshot {
    pub venue: Venue,
    pub windows: Vec<MaintenanceWindow>,
    pub reservations: Vec<Reservation>,
    pub bookings: Vec<Booking>,
}

impl AvailabilitySnapshot {
    /// Load the snapshot for a venue, bounding booking/reservation reads to
    /// records that can still clash with an interval starting at `from_date`
    pub async fn load(
        conn: &mut PgConnection,
        venue_id: i32,
        from_date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(venue) = venues_repo::find_venue(&mut *conn, venue_id).await? else {
            return Ok(None);
        };

        let windows = venues_repo::find_maintenance_windows(&mut *conn, venue_id).await?;
        let reservations = venues_repo::find_reservations_from(&mut *conn, venue_id, from_date).await?;
        let bookings = bookings_repo::find_bookings_from(&mut *conn, venue_id, from_date).await?;

        Ok(Some(Self {
            venue,
            windows,
            reservations,
            bookings,
        }))
    }
}
