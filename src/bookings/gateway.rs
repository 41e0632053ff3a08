// Payment gateway boundary
//
// The engine only needs to submit a payment and later receive an
// asynchronous callback; everything behind that is external. The trait keeps
// the seam mockable for tests and local runs.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::bookings::models::BookingData;

/// Consumer identity forwarded to the gateway
#[derive(Debug, Clone)]
pub struct ConsumerInfo {
    pub name: String,
    pub email: String,
}

/// Payment submission: `{type, amount, consumerInfo, bookingData}`
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    /// Venue kind being paid for, e.g. "hall"
    pub payment_type: String,
    pub amount: Decimal,
    pub consumer: ConsumerInfo,
    pub booking: BookingData,
}

/// Session opened by the gateway for one payment
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Reference echoed back in the asynchronous callback
    pub reference: String,
    /// Channels the payer may choose from
    pub channels: Vec<String>,
}

/// Error types for gateway submissions
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Payment gateway rejected the submission: {0}")]
    Rejected(String),

    #[error("Payment gateway unreachable: {0}")]
    Unreachable(String),
}

/// Outbound payment-gateway contract
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session; the gateway later reports the outcome through
    /// the payment-callback endpoint
    async fn create_payment(&self, submission: &PaymentSubmission)
        -> Result<PaymentSession, GatewayError>;
}

/// In-process gateway used by local runs and tests
///
/// Accepts every submission and hands back a fresh reference; the outcome is
/// driven by whatever the test posts to the callback endpoint.
#[derive(Debug, Default, Clone)]
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentSession, GatewayError> {
        tracing::debug!(
            "Mock gateway accepting {} payment of {} for {}",
            submission.payment_type,
            submission.amount,
            submission.consumer.email
        );

        Ok(PaymentSession {
            reference: Uuid::new_v4().to_string(),
            channels: vec![
                "card".to_string(),
                "bank-transfer".to_string(),
                "wallet".to_string(),
            ],
        })
    }
}
