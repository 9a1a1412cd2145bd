//! # Order Preparation
//!
//! Turns a priced cart into the values the order sink persists and the
//! amount the payment collaborator charges. Nothing here writes anywhere.
//!
//! ## Checkout Data Flow
//! ```text
//! Cart ──► prepare_order_lines() ──► Vec<OrderLine> ──► RentalOrder ──► OrderSink
//!   │
//!   └────► PaymentRequest::for_cart() ──► amount ──► PaymentGateway (UPI only)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, PricingError};
use crate::money::Money;
use crate::pricing::{cart_total, line_total, LinePrice};
use crate::types::{Cart, DateRange, OrderStatus, PaymentMethod, ResourceType};
use crate::validation::validate_payment_details;

// =============================================================================
// Order Line
// =============================================================================

/// One persisted line of a placed order, with its total frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub resource_id: String,
    pub resource_type: ResourceType,
    /// Name at time of order (frozen).
    pub name: String,
    pub resolved_start_date: Option<NaiveDate>,
    pub resolved_end_date: Option<NaiveDate>,
    pub quantity: i64,
    pub line_total: Money,
}

impl OrderLine {
    /// The rental range for camera lines.
    pub fn rental_range(&self) -> Option<DateRange> {
        DateRange::new(self.resolved_start_date?, self.resolved_end_date?).ok()
    }
}

/// Prices every line of the cart for persistence.
///
/// Fails if any line cannot be priced, including pending camera lines.
pub fn prepare_order_lines(cart: &Cart) -> Result<Vec<OrderLine>, PricingError> {
    cart.items
        .iter()
        .map(|item| {
            let total = match line_total(item)? {
                LinePrice::Priced(amount) => amount,
                LinePrice::Pending => {
                    return Err(PricingError::IncompleteBooking {
                        resource_id: item.resource_id.clone(),
                    })
                }
            };

            let range = match item.rental_dates() {
                Some(dates) => dates.resolve(&item.resource_id)?,
                None => None,
            };

            Ok(OrderLine {
                resource_id: item.resource_id.clone(),
                resource_type: item.resource_type(),
                name: item.name.clone(),
                resolved_start_date: range.map(|r| r.start()),
                resolved_end_date: range.map(|r| r.end()),
                quantity: item.quantity,
                line_total: total,
            })
        })
        .collect()
}

// =============================================================================
// Payment Request
// =============================================================================

/// What the payment collaborator is asked to collect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Money,
    pub method: PaymentMethod,
    pub upi_id: Option<String>,
}

impl PaymentRequest {
    /// Builds a request from a final cart total.
    ///
    /// ## Errors
    /// - `EmptyCart` - nothing to pay for
    /// - `Validation` - UPI selected without a valid UPI ID
    /// - `Pricing` - a line is not priceable yet
    pub fn for_cart(cart: &Cart, method: PaymentMethod, upi_id: Option<&str>) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_payment_details(method, upi_id)?;

        Ok(PaymentRequest {
            amount: cart_total(cart)?,
            method,
            upi_id: match method {
                PaymentMethod::Upi => upi_id.map(|s| s.trim().to_string()),
                PaymentMethod::CashOnDelivery => None,
            },
        })
    }
}

// =============================================================================
// Rental Order
// =============================================================================

/// A placed order as handed to the order sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalOrder {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub payment_method: PaymentMethod,
    pub upi_id: Option<String>,
    pub status: OrderStatus,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl RentalOrder {
    /// Camera lines with their rental ranges; each becomes a booking.
    pub fn camera_rentals(&self) -> impl Iterator<Item = (&OrderLine, DateRange)> {
        self.lines
            .iter()
            .filter(|l| l.resource_type == ResourceType::Camera)
            .filter_map(|l| l.rental_range().map(|r| (l, r)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
