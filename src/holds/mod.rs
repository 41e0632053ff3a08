// Hold manager
//
// Short-lived exclusive claims on venues, created when a checkout starts and
// cleared by the booking finalizer (success), the caller (gateway failure)
// or the reconciliation scheduler (timeout backstop).

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::HoldError;
pub use models::Hold;
pub use repository::HoldsRepository;
pub use service::HoldManager;
