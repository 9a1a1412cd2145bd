//! # Checkout Errors
//!
//! [`CheckoutError`] is what the service returns; [`ApiError`] is what the
//! storefront receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutService::place_order                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation? ──── CoreError::Validation ──────┐                         │
//! │         │                                     │                         │
//! │         ▼                                     │                         │
//! │  Dates taken? ─── AvailabilityError::Overlap ─┤                         │
//! │         │                                     ▼                         │
//! │         ▼                               CheckoutError ──► ApiError ──►  │
//! │  Storage? ─────── DbError ────────────────────┤          { code,        │
//! │         │                                     │            message }    │
//! │         ▼                                     │                         │
//! │  Payment? ─────── PaymentFailed ──────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lensrent_core::{AvailabilityError, CoreError, PaymentMethod, PricingError, ValidationError};
use lensrent_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Errors from the checkout service.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),

    /// The storefront has this method switched off.
    #[error("Payment method {method:?} is not available")]
    PaymentMethodUnavailable { method: PaymentMethod },

    /// Payment did not go through; the order was cancelled and its
    /// bookings released.
    #[error("Payment for order {order_id} failed: {reason}")]
    PaymentFailed { order_id: String, reason: String },

    /// The session cart has no camera line with this id.
    #[error("Camera {resource_id} is not in the cart")]
    NotInCart { resource_id: String },
}

impl From<AvailabilityError> for CheckoutError {
    fn from(err: AvailabilityError) -> Self {
        CheckoutError::Core(err.into())
    }
}

impl From<PricingError> for CheckoutError {
    fn from(err: PricingError) -> Self {
        CheckoutError::Core(err.into())
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(err.into())
    }
}

/// Convenience alias for checkout results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned to the storefront.
///
/// ## Serialization
/// ```json
/// {
///   "code": "DATES_UNAVAILABLE",
///   "message": "Dates unavailable, conflicts with booking from 2024-07-01 to 2024-07-05"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Requested dates overlap an existing booking (409)
    DatesUnavailable,

    /// Camera rental dates missing or inverted (422)
    IncompleteBooking,

    /// Cart operation failed
    CartError,

    /// Payment processing error
    PaymentError,

    /// Database operation failed (500)
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Availability(AvailabilityError::Overlap { .. }) => {
                ApiError::new(ErrorCode::DatesUnavailable, message)
            }
            CoreError::Availability(AvailabilityError::InvalidRange { .. }) => {
                ApiError::validation(message)
            }
            CoreError::Pricing(PricingError::Overflow { .. }) => {
                ApiError::new(ErrorCode::CartError, message)
            }
            CoreError::Pricing(_) => ApiError::new(ErrorCode::IncompleteBooking, message),
            CoreError::Validation(_) => ApiError::validation(message),
            CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, message),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Storage operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(e) => e.into(),
            CheckoutError::Storage(e) => e.into(),
            e @ CheckoutError::PaymentMethodUnavailable { .. } => ApiError::validation(e.to_string()),
            e @ CheckoutError::PaymentFailed { .. } => {
                ApiError::new(ErrorCode::PaymentError, e.to_string())
            }
            CheckoutError::NotInCart { resource_id } => ApiError::not_found("Cart item", &resource_id),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lensrent_core::BookingRange;

    fn jul(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[test]
    fn test_overlap_maps_to_dates_unavailable() {
        let err = CheckoutError::from(AvailabilityError::Overlap {
            conflicting: BookingRange::new("b1", "cam1", jul(1), jul(5)),
        });
        let api = ApiError::from(err);

        assert_eq!(api.code, ErrorCode::DatesUnavailable);
        assert_eq!(
            api.message,
            "Dates unavailable, conflicts with booking from 2024-07-01 to 2024-07-05"
        );
    }

    #[test]
    fn test_incomplete_booking_code() {
        let api = ApiError::from(CheckoutError::from(PricingError::IncompleteBooking {
            resource_id: "cam1".to_string(),
        }));
        assert_eq!(api.code, ErrorCode::IncompleteBooking);
    }

    #[test]
    fn test_overflow_is_a_cart_error() {
        let api = ApiError::from(CheckoutError::from(PricingError::Overflow {
            resource_id: "pkg1".to_string(),
        }));
        assert_eq!(api.code, ErrorCode::CartError);
        assert_eq!(api.message, "Total for pkg1 is too large");
    }

    #[test]
    fn test_not_in_cart_maps_to_not_found() {
        let api = ApiError::from(CheckoutError::NotInCart {
            resource_id: "cam9".to_string(),
        });
        assert_eq!(api.code, ErrorCode::NotFound);
        assert_eq!(api.message, "Cart item not found: cam9");
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let api = ApiError::from(CheckoutError::Storage(DbError::Internal("disk on fire".into())));
        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert!(!api.message.contains("disk"));

        let api = ApiError::from(DbError::not_found("Order", "o1"));
        assert_eq!(api.code, ErrorCode::NotFound);
        assert_eq!(api.message, "Order not found: o1");
    }

    #[test]
    fn test_serialized_shape() {
        let api = ApiError::new(ErrorCode::PaymentError, "declined");
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "PAYMENT_ERROR");
        assert_eq!(json["message"], "declined");
    }
}
