use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::bookings::models::{Booking, PaymentStatus};
use crate::venues::TimeSlot;

const BOOKING_COLUMNS: &str = "id, venue_id, booked_from, booked_to, time_slot, start_time, \
     end_time, guests, amount, payment_status, booked_by, created_at";

/// Fields for a booking about to be inserted by the finalizer
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub venue_id: i32,
    pub booked_from: NaiveDate,
    pub booked_to: NaiveDate,
    pub time_slot: Option<TimeSlot>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub guests: i32,
    pub amount: Decimal,
    pub booked_by: String,
}

/// Bookings for a venue that can still clash with an interval starting at
/// `from_date`, loadable through any connection including a transaction
pub async fn find_bookings_from(
    conn: &mut PgConnection,
    venue_id: i32,
    from_date: NaiveDate,
) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(&format!(
        r#"
        SELECT {}
        FROM bookings
        WHERE venue_id = $1 AND booked_to >= $2
        ORDER BY booked_from
        "#,
        BOOKING_COLUMNS
    ))
    .bind(venue_id)
    .bind(from_date)
    .fetch_all(conn)
    .await
}

/// Insert a confirmed booking inside the finalizing transaction
///
/// Only the finalizer calls this, after the availability re-check has passed
/// inside the same transaction; the partial unique index on
/// (venue_id, booked_from, time_slot) is the database-level backstop for
/// slot venues.
pub async fn insert_booking_in_tx(
    conn: &mut PgConnection,
    new: &NewBooking,
) -> Result<Booking, sqlx::Error> {
    sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings
            (venue_id, booked_from, booked_to, time_slot, start_time, end_time,
             guests, amount, payment_status, booked_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    ))
    .bind(new.venue_id)
    .bind(new.booked_from)
    .bind(new.booked_to)
    .bind(new.time_slot)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.guests)
    .bind(new.amount)
    .bind(PaymentStatus::Paid)
    .bind(&new.booked_by)
    .fetch_one(conn)
    .await
}
