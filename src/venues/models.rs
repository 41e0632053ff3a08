use chrono::{NaiveDate, DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Venue kind enum covering every bookable resource category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Room,
    Hall,
    Lawn,
    Photoshoot,
}

impl VenueKind {
    /// Convert kind to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::Room => "room",
            VenueKind::Hall => "hall",
            VenueKind::Lawn => "lawn",
            VenueKind::Photoshoot => "photoshoot",
        }
    }

    /// Parse kind from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "room" => Ok(VenueKind::Room),
            "hall" => Ok(VenueKind::Hall),
            "lawn" => Ok(VenueKind::Lawn),
            "photoshoot" => Ok(VenueKind::Photoshoot),
            _ => Err(format!("Invalid venue kind: {}", s)),
        }
    }
}

impl std::fmt::Display for VenueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse time-of-day slot for venues booked by day part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Evening,
    Night,
}

impl TimeSlot {
    /// Convert slot to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
        }
    }

    /// Parse slot from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(TimeSlot::Morning),
            "evening" => Ok(TimeSlot::Evening),
            "night" => Ok(TimeSlot::Night),
            _ => Err(format!("Invalid time slot: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a bookable venue in the database
///
/// Status flags (`is_active`, `is_out_of_service`, `is_reserved`) are derived
/// projections recomputed by the reconciliation scheduler; the hold columns
/// implement the at-most-one-active-hold invariant directly on the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub kind: VenueKind,
    pub is_active: bool,
    /// Lawns use this flag where other kinds use `is_active`
    pub is_out_of_service: bool,
    /// Rooms only: any admin reservation covers today (denormalized)
    pub is_reserved: bool,
    pub min_guests: i32,
    pub max_guests: i32,
    pub price: Decimal,
    pub on_hold: bool,
    pub hold_expiry: Option<DateTime<Utc>>,
    pub hold_by: Option<String>,
}

/// Admin-declared blackout period during which a venue is unavailable
///
/// Dates are inclusive on both ends; windows may overlap each other and a
/// venue is blocked if any window covers the queried date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct MaintenanceWindow {
    pub id: i32,
    pub venue_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl MaintenanceWindow {
    /// Whether this window blocks the given date (inclusive bounds)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Admin-side manual block of a venue, distinct from a member booking
///
/// `reserved_to` is an exclusive upper bound.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub venue_id: i32,
    pub reserved_from: NaiveDate,
    pub reserved_to: NaiveDate,
    pub time_slot: Option<TimeSlot>,
    pub reserved_by: String,
}
