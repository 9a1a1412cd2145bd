//! # Validation Module
//!
//! Input validation at the edge of the core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront form                                              │
//! │  ├── Date picker greys out booked days                                 │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Dates parse as calendar dates (no silent undefined)               │
//! │  ├── Quantities, prices, rental length in range                        │
//! │  └── UPI ID present and well-formed when paying by UPI                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: availability + pricing                                       │
//! │  └── Overlap / incomplete-date outcomes                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lensrent_core::validation::{parse_date, validate_upi_id};
//!
//! assert!(parse_date("rentStartDate", "2024-07-06").is_ok());
//! assert!(parse_date("rentStartDate", "06/07/2024").is_err());
//! assert!(validate_upi_id("asha@okbank").is_ok());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DateRange, PaymentMethod};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Date Validators
// =============================================================================

/// Parses an ISO `YYYY-MM-DD` date from the storefront.
///
/// Stored timestamps are normalised to dates by the caller before they
/// reach the core; anything that is not a calendar date is rejected here.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

/// Parses an optional date field; empty or absent means "not picked".
pub fn parse_optional_date(field: &str, value: Option<&str>) -> ValidationResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(field, v).map(Some),
    }
}

/// Validates the length of a camera rental.
///
/// ## Rules
/// - At most `max_days` inclusive days (storefront default: 30)
pub fn validate_rent_days(range: &DateRange, max_days: i64) -> ValidationResult<()> {
    let days = range.days();
    if days > max_days {
        return Err(ValidationError::OutOfRange {
            field: "rental days".to_string(),
            min: 1,
            max: max_days,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity (or freelancer hours).
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price. Zero is allowed; negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates cart size (number of distinct lines) before adding one more.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates a UPI virtual payment address such as `asha@okbank`.
///
/// ## Rules
/// - Required
/// - Exactly one `@`, with a non-empty handle and provider
/// - Handle: letters, digits, `.`, `-`, `_`; provider: letters only
/// - At most 255 characters
pub fn validate_upi_id(upi_id: &str) -> ValidationResult<()> {
    let upi_id = upi_id.trim();

    if upi_id.is_empty() {
        return Err(ValidationError::Required {
            field: "upi id".to_string(),
        });
    }

    if upi_id.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "upi id".to_string(),
            max: 255,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "upi id".to_string(),
        reason: reason.to_string(),
    };

    let (handle, provider) = upi_id
        .split_once('@')
        .ok_or_else(|| invalid("must look like name@provider"))?;

    if handle.is_empty() || provider.is_empty() || provider.contains('@') {
        return Err(invalid("must look like name@provider"));
    }

    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(invalid("name may contain only letters, digits, '.', '-' and '_'"));
    }

    if !provider.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("provider may contain only letters"));
    }

    Ok(())
}

/// Validates the payment details entered on the checkout form.
///
/// Cash on delivery ignores `upi_id`; UPI requires a valid one.
pub fn validate_payment_details(method: PaymentMethod, upi_id: Option<&str>) -> ValidationResult<()> {
    match method {
        PaymentMethod::CashOnDelivery => Ok(()),
        PaymentMethod::Upi => validate_upi_id(upi_id.unwrap_or_default()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
