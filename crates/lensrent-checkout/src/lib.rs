//! # LensRent Checkout
//!
//! Storefront session state and order placement on top of `lensrent-core`
//! and `lensrent-db`.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or "lensrent=debug,info"         │
//! │  2. CheckoutConfig::from_env  LENSRENT_* variables                      │
//! │  3. Database::new             pool + migrations                         │
//! │  4. CheckoutService::new      Database as booking source + order sink   │
//! │  5. CartState::new            one per storefront session                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod payment;
pub mod sources;

pub use cart::CartState;
pub use checkout::{CheckoutReceipt, CheckoutRequest, CheckoutService};
pub use config::{CheckoutConfig, ConfigError};
pub use error::{ApiError, CheckoutError, CheckoutResult, ErrorCode};
pub use payment::{PaymentError, PaymentGateway, PaymentOutcome};
pub use sources::{BookingSource, OrderSink};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=lensrent_db=trace` - Trace the storage crate only
/// - Default: debug for lensrent crates, info elsewhere
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lensrent=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
