//! # Payment Gateway
//!
//! Collection of UPI payments. Cash on delivery never reaches a gateway.
//!
//! ```text
//! PaymentRequest { amount, method: upi, upi_id }
//!        │
//!        ▼
//! PaymentGateway::collect ──► Ok(Paid { reference })  ──► order confirmed
//!                         ├─► Ok(Declined { reason }) ──► order cancelled
//!                         └─► Err(PaymentError)       ──► order cancelled
//! ```

use async_trait::async_trait;
use lensrent_core::order::PaymentRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the gateway reported for a collect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PaymentOutcome {
    /// Money received; `reference` is the provider's transaction id.
    Paid { reference: String },

    /// The payer or their bank refused.
    Declined { reason: String },
}

/// The gateway could not be reached or answered nonsense.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// A payment provider able to collect a UPI payment.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn collect(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError>;
}
