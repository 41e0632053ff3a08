use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::availability::RequestedInterval;
use crate::venues::{TimeSlot, VenueKind};

/// Payment state of a confirmed booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Convert payment status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a confirmed booking in the database
///
/// Rooms span `[booked_from, booked_to)`; slot venues store a single day with
/// `booked_to = booked_from` plus the slot; photoshoots additionally carry
/// the session start/end times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub venue_id: i32,
    pub booked_from: NaiveDate,
    pub booked_to: NaiveDate,
    pub time_slot: Option<TimeSlot>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub guests: i32,
    pub amount: Decimal,
    pub payment_status: PaymentStatus,
    pub booked_by: String,
    pub created_at: DateTime<Utc>,
}

/// The interval and party details a member wants to book
///
/// One shape serves every venue kind; `to_interval` enforces that the fields
/// present match the kind being booked.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct BookingData {
    pub venue_id: i32,
    /// Rooms: stay dates, checkout exclusive
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    /// Halls/lawns/photoshoots: the single booked day
    pub date: Option<NaiveDate>,
    /// Halls and lawns only
    pub slot: Option<TimeSlot>,
    /// Photoshoots only; the session end is derived
    pub start_time: Option<NaiveTime>,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guests: i32,
    #[validate(length(min = 1, max = 100, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "A valid customer email is required"))]
    pub customer_email: String,
}

impl BookingData {
    /// Shape the request into the interval form the checker expects
    pub fn to_interval(&self, kind: VenueKind) -> Result<RequestedInterval, String> {
        match kind {
            VenueKind::Room => match (self.check_in, self.check_out) {
                (Some(check_in), Some(check_out)) => {
                    Ok(RequestedInterval::DateRange { check_in, check_out })
                }
                _ => Err("Room bookings require check_in and check_out dates".to_string()),
            },
            VenueKind::Hall | VenueKind::Lawn => match (self.date, self.slot) {
                (Some(date), Some(slot)) => Ok(RequestedInterval::DaySlot { date, slot }),
                _ => Err("Hall and lawn bookings require a date and a time slot".to_string()),
            },
            VenueKind::Photoshoot => match (self.date, self.start_time) {
                (Some(date), Some(start_time)) => {
                    Ok(RequestedInterval::TimedSession { date, start_time })
                }
                _ => Err("Photoshoot bookings require a date and a start time".to_string()),
            },
        }
    }
}

/// Request DTO for the invoice-generation endpoint
pub type InvoiceRequest = BookingData;

/// Invoice descriptor returned when a hold was successfully taken
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InvoiceResponse {
    /// Gateway reference echoed back in the payment callback
    pub reference: String,
    pub venue_id: i32,
    pub venue_name: String,
    pub amount: Decimal,
    /// The hold expiry; payment must complete before this instant
    pub due_at: DateTime<Utc>,
    pub payment_channels: Vec<String>,
}

/// Terminal state reported by the payment gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Failed,
}

/// Asynchronous callback from the payment gateway
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PaymentCallbackRequest {
    #[validate(length(min = 1, message = "Gateway reference is required"))]
    pub reference: String,
    pub outcome: PaymentOutcome,
    #[validate]
    pub booking: BookingData,
}

/// Response for the payment callback endpoint
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FinalizeResponse {
    /// "confirmed" when a booking was committed, "released" when a failed
    /// payment's hold was compensated away
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> BookingData {
        BookingData {
            venue_id: 1,
            check_in: None,
            check_out: None,
            date: None,
            slot: None,
            start_time: None,
            guests: 2,
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn room_interval_requires_both_stay_dates() {
        let mut req = data();
        req.check_in = NaiveDate::from_ymd_opt(2025, 6, 10);
        assert!(req.to_interval(VenueKind::Room).is_err());

        req.check_out = NaiveDate::from_ymd_opt(2025, 6, 12);
        assert!(matches!(
            req.to_interval(VenueKind::Room),
            Ok(RequestedInterval::DateRange { .. })
        ));
    }

    #[test]
    fn slot_venues_require_date_and_slot() {
        let mut req = data();
        req.date = NaiveDate::from_ymd_opt(2025, 6, 10);
        assert!(req.to_interval(VenueKind::Hall).is_err());

        req.slot = Some(TimeSlot::Evening);
        assert!(matches!(
            req.to_interval(VenueKind::Lawn),
            Ok(RequestedInterval::DaySlot { .. })
        ));
    }

    #[test]
    fn photoshoot_requires_date_and_start_time() {
        let mut req = data();
        req.date = NaiveDate::from_ymd_opt(2025, 6, 10);
        req.start_time = NaiveTime::from_hms_opt(10, 0, 0);
        assert!(matches!(
            req.to_interval(VenueKind::Photoshoot),
            Ok(RequestedInterval::TimedSession { .. })
        ));
    }
}
