// Venue catalog module
//
// Models and read-only data access for bookable venues, their maintenance
// windows and admin reservations. Catalog writes happen through external
// admin CRUD; the engine only reads them and derives status flags.

pub mod models;
pub mod repository;

pub use models::{MaintenanceWindow, Reservation, TimeSlot, Venue, VenueKind};
pub use repository::VenueRepository;
