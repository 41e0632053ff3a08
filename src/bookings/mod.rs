// Booking checkout flow
//
// Inbound invoice endpoint (check -> hold -> payment session) and the
// payment-callback finalizer that converts a held venue into a confirmed
// booking inside one transaction.

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::BookingError;
pub use gateway::{MockPaymentGateway, PaymentGateway};
pub use handlers::*;
pub use models::*;
pub use service::BookingService;
