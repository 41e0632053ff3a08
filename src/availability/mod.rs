// Interval conflict checker
//
// Determines whether a venue is free for a requested interval given existing
// bookings, admin reservations, maintenance windows and active holds. The
// evaluation itself is a pure function over a loaded snapshot with an
// injected clock, so every rule is testable without a database or a timer.

pub mod checker;
pub mod error;
pub mod models;
pub mod service;
pub mod snapshot;

pub use checker::CheckerPolicy;
pub use error::AvailabilityError;
pub use models::{AvailabilityDecision, AvailabilityRequest, Conflict, RequestedInterval};
pub use service::AvailabilityService;
pub use snapshot::AvailabilitySnapshot;
