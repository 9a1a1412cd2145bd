//! # lensrent-core: Pure Rental Logic for LensRent
//!
//! This crate is the **heart** of LensRent. It contains the booking
//! availability checks and cart pricing as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LensRent Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI                                │   │
//! │  │   Camera Detail ──► Date Picker ──► Cart ──► Checkout           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lensrent-checkout                            │   │
//! │  │    CartState, CheckoutService, PaymentGateway                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ lensrent-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │availability│  │  pricing  │  │   order   │  │ validation│  │   │
//! │  │   │ overlap    │  │ line/cart │  │ OrderLine │  │   rules   │  │   │
//! │  │   │ disabled   │  │  totals   │  │ Payment   │  │  checks   │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lensrent-db (Database Layer)                 │   │
//! │  │              bookings, rental orders, migrations                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BookingRange, CartLineItem, Cart, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation at the core's boundary
//! - [`availability`] - Booking overlap and disabled calendar dates
//! - [`pricing`] - Line and cart totals, cart mutations
//! - [`order`] - Values prepared for the order sink and payment collaborator
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use lensrent_core::availability::validate_candidate_range;
//! use lensrent_core::BookingRange;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
//! let existing = vec![BookingRange::new("b1", "cam1", d(1), d(5))];
//!
//! // Shared boundary day is a conflict
//! assert!(validate_candidate_range(Some(d(5)), Some(d(8)), &existing).is_err());
//! assert!(validate_candidate_range(Some(d(6)), Some(d(8)), &existing).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::AvailabilityChecker;
pub use error::{AvailabilityError, CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use pricing::{CartSummary, LinePrice};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest camera rental, in inclusive days.
///
/// The storefront's duration picker has always been capped at 30 days.
pub const MAX_RENT_DAYS: i64 = 30;

/// Maximum distinct line items in a single cart.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity (or freelancer hours) on one line.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// How far ahead `AvailabilityChecker::first_available_from` searches.
pub const AVAILABILITY_HORIZON_DAYS: i64 = 365;
