use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::venues::TimeSlot;

/// The interval a requester wants to claim, shaped by the venue kind
#[derive(Debug, Clone, PartialEq)]
pub enum RequestedInterval {
    /// Rooms: multi-night stay, checkout date exclusive
    DateRange { check_in: NaiveDate, check_out: NaiveDate },
    /// Halls and lawns: one whole day in a coarse slot
    DaySlot { date: NaiveDate, slot: TimeSlot },
    /// Photoshoots: a fixed-length session starting at a given time
    TimedSession { date: NaiveDate, start_time: NaiveTime },
}

impl RequestedInterval {
    /// Earliest date touched by this interval, used to bound snapshot reads
    pub fn first_date(&self) -> NaiveDate {
        match self {
            RequestedInterval::DateRange { check_in, .. } => *check_in,
            RequestedInterval::DaySlot { date, .. } => *date,
            RequestedInterval::TimedSession { date, .. } => *date,
        }
    }

    /// Requested slot, where the interval carries one
    pub fn slot(&self) -> Option<TimeSlot> {
        match self {
            RequestedInterval::DaySlot { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

/// A conflict-check request for one venue
#[derive(Debug, Clone)]
pub struct AvailabilityRequest {
    pub venue_id: i32,
    pub interval: RequestedInterval,
    pub guests: i32,
    /// Claimant identity; a hold owned by the same requester is not a conflict
    pub requester: String,
}

/// The specific record blocking a request, with enough context to render an
/// actionable message
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Conflict {
    /// Venue gated off by its derived status flag
    VenueInactive,
    GuestCount {
        min: i32,
        max: i32,
        requested: i32,
    },
    Maintenance {
        window_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: String,
        /// True when the window covers today (messaging only; blocking
        /// semantics are identical to a scheduled window)
        currently_out: bool,
    },
    Hold {
        held_until: DateTime<Utc>,
    },
    Reservation {
        reservation_id: i32,
        reserved_from: NaiveDate,
        reserved_to: NaiveDate,
        time_slot: Option<TimeSlot>,
    },
    Booking {
        booking_id: Uuid,
        booked_from: NaiveDate,
        booked_to: NaiveDate,
        time_slot: Option<TimeSlot>,
    },
    InvalidInterval {
        detail: String,
    },
    OutsideServiceHours {
        earliest_start: NaiveTime,
        latest_start: NaiveTime,
    },
}

impl Conflict {
    /// Human-readable explanation for the caller
    pub fn message(&self) -> String {
        match self {
            Conflict::VenueInactive => "Venue is not currently active".to_string(),
            Conflict::GuestCount { min, max, requested } => format!(
                "Guest count {} is outside the allowed range {}..={}",
                requested, min, max
            ),
            Conflict::Maintenance { start_date, end_date, description, currently_out, .. } => {
                if *currently_out {
                    format!(
                        "Venue is currently out of service until {} ({})",
                        end_date, description
                    )
                } else {
                    format!(
                        "Venue has maintenance scheduled from {} to {} ({})",
                        start_date, end_date, description
                    )
                }
            }
            Conflict::Hold { held_until } => format!(
                "Venue is currently on hold by another user until {}",
                held_until.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Conflict::Reservation { reserved_from, reserved_to, time_slot, .. } => match time_slot {
                Some(slot) => format!(
                    "Venue is reserved by the administration from {} to {} ({} slot)",
                    reserved_from, reserved_to, slot
                ),
                None => format!(
                    "Venue is reserved by the administration from {} to {}",
                    reserved_from, reserved_to
                ),
            },
            Conflict::Booking { booked_from, booked_to, time_slot, .. } => match time_slot {
                Some(slot) => format!("Venue is already booked on {} ({} slot)", booked_from, slot),
                None => format!("Venue is already booked from {} to {}", booked_from, booked_to),
            },
            Conflict::InvalidInterval { detail } => detail.clone(),
            Conflict::OutsideServiceHours { earliest_start, latest_start } => format!(
                "Sessions must start between {} and {}",
                earliest_start, latest_start
            ),
        }
    }
}

/// Outcome of a conflict check: free, or blocked by a specific record
#[derive(Debug, Clone)]
pub enum AvailabilityDecision {
    Available,
    Conflict(Conflict),
}

impl AvailabilityDecision {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityDecision::Available)
    }
}
