//! # Error Types
//!
//! Domain-specific error types for lensrent-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lensrent-core errors (this file)                                      │
//! │  ├── AvailabilityError - Candidate range rejected (invalid / overlap)  │
//! │  ├── PricingError      - Line item not priceable                       │
//! │  ├── ValidationError   - Input validation failures                     │
//! │  └── CoreError         - Umbrella for all of the above                 │
//! │                                                                         │
//! │  lensrent-db errors (separate crate)                                   │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  lensrent-checkout errors                                              │
//! │  └── ApiError          - What the storefront sees (serialized)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overlaps and incomplete dates are ordinary outcomes the UI renders
//! inline, so every one of them is a typed variant here. Nothing in this
//! crate panics on domain conditions.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::BookingRange;

// =============================================================================
// Availability Error
// =============================================================================

/// Why a candidate rental range cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    /// A date is missing, or the end precedes the start.
    #[error("Invalid date range: {reason}")]
    InvalidRange { reason: String },

    /// The candidate shares at least one day with a confirmed booking.
    ///
    /// ## User Workflow
    /// ```text
    /// Existing booking: 2024-07-01 → 2024-07-05
    /// Candidate:        2024-07-05 → 2024-07-08
    ///      │
    ///      ▼
    /// Overlap { conflicting: 07-01..07-05 }
    ///      │
    ///      ▼
    /// UI shows: "Dates unavailable, conflicts with booking from
    ///            2024-07-01 to 2024-07-05"
    /// ```
    #[error("Dates unavailable, conflicts with booking {conflicting}")]
    Overlap { conflicting: BookingRange },
}

impl AvailabilityError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AvailabilityError::InvalidRange {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Pricing Error
// =============================================================================

/// Why a line item (or a whole cart) cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A camera line has only one of its two dates, or has none when a
    /// final total is required.
    #[error("Rental dates incomplete for {resource_id}")]
    IncompleteBooking { resource_id: String },

    /// A camera line's end date precedes its start date.
    #[error("Rental for {resource_id} ends ({end}) before it starts ({start})")]
    InvalidRange {
        resource_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// A line total or the cart total does not fit in [`crate::Money`].
    #[error("Total for {resource_id} is too large")]
    Overflow { resource_id: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date, invalid UPI ID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error for callers that mix availability, pricing and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
