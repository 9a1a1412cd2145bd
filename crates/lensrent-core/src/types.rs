//! # Domain Types
//!
//! Core domain types used throughout LensRent.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BookingRange   │   │  CartLineItem   │   │      Cart       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  resource_id    │   │  resource_id    │   │  items (Vec)    │       │
//! │  │  start_date?    │   │  unit_price     │   │  no duplicate   │       │
//! │  │  end_date?      │   │  quantity       │   │  (id, type)     │       │
//! │  └─────────────────┘   │  resource ──────┼─┐ └─────────────────┘       │
//! │                        └─────────────────┘ │                            │
//! │  ┌─────────────────┐   ┌─────────────────┐ │                            │
//! │  │   DateRange     │   │  LineItemKind   │◄┘                            │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  start <= end   │   │  Camera(dates)  │  only cameras carry dates    │
//! │  │  days() >= 1    │   │  Accessory      │                              │
//! │  └─────────────────┘   │  Freelancer     │                              │
//! │                        │  Package        │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{AvailabilityError, PricingError};
use crate::money::Money;

// =============================================================================
// Date Range
// =============================================================================

/// A validated closed interval of whole calendar days (`start <= end`).
///
/// Both endpoints are rental days: a range from the 1st to the 3rd covers
/// three days, and a same-day range covers one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AvailabilityError> {
        if end < start {
            return Err(AvailabilityError::invalid(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(DateRange { start, end })
    }

    /// A one-day range.
    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive day count, never less than 1.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use lensrent_core::DateRange;
    ///
    /// let jun = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
    /// assert_eq!(DateRange::new(jun(1), jun(3)).unwrap().days(), 3);
    /// assert_eq!(DateRange::single(jun(1)).days(), 1);
    /// ```
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day in the range, both endpoints included.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Returns the range shifted forward by `days`.
    pub fn shifted(&self, days: u64) -> Option<Self> {
        Some(DateRange {
            start: self.start.checked_add_days(Days::new(days))?,
            end: self.end.checked_add_days(Days::new(days))?,
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} to {}", self.start, self.end)
    }
}

// =============================================================================
// Booking Range
// =============================================================================

/// One confirmed reservation of a rentable resource.
///
/// Dates are optional because stored documents are not always complete.
/// A range missing either endpoint is ignored by the availability checks
/// rather than treated as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingRange {
    /// Booking id (UUID v4 when created by LensRent).
    pub id: String,

    /// The rented resource, e.g. a camera id.
    pub resource_id: String,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,
}

impl BookingRange {
    /// Creates a fully specified booking.
    pub fn new(
        id: impl Into<String>,
        resource_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        BookingRange {
            id: id.into(),
            resource_id: resource_id.into(),
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Creates a booking covering a validated range.
    pub fn from_range(id: impl Into<String>, resource_id: impl Into<String>, range: DateRange) -> Self {
        BookingRange::new(id, resource_id, range.start(), range.end())
    }

    /// Returns `(start, end)` when both endpoints are present.
    ///
    /// Inverted pairs are returned as stored; callers decide what to do
    /// with them.
    pub fn endpoints(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }
}

impl fmt::Display for BookingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Option<NaiveDate>| d.map_or_else(|| "?".to_string(), |d| d.to_string());
        write!(f, "from {} to {}", show(self.start_date), show(self.end_date))
    }
}

// =============================================================================
// Resource Type
// =============================================================================

/// The catalog a rentable resource comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Day-rate rental; the only date-ranged type.
    Camera,
    Accessory,
    /// Quantity counts hours booked.
    Freelancer,
    Package,
}

impl ResourceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Camera => "camera",
            ResourceType::Accessory => "accessory",
            ResourceType::Freelancer => "freelancer",
            ResourceType::Package => "package",
        }
    }

    /// Whether line totals for this type depend on a rental date range.
    pub const fn is_date_ranged(&self) -> bool {
        matches!(self, ResourceType::Camera)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rental Dates
// =============================================================================

/// The date-picker state of a camera line.
///
/// ## State Machine
/// ```text
/// NoDatesSelected ──pick start──► (partial) ──pick end──► DatesSelected
///        ▲                                                     │
///        └────────────── clear ◄───────────────────────────────┤
///                                                              ▼
///                                                    resolve() ─► Validated
/// ```
///
/// The partial state is allowed while the user is picking, but pricing
/// it is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalDates {
    #[serde(default)]
    pub rent_start_date: Option<NaiveDate>,

    #[serde(default)]
    pub rent_end_date: Option<NaiveDate>,
}

impl RentalDates {
    /// No dates picked yet.
    pub const fn none() -> Self {
        RentalDates {
            rent_start_date: None,
            rent_end_date: None,
        }
    }

    /// Both dates picked (order not checked until `resolve`).
    pub const fn selected(start: NaiveDate, end: NaiveDate) -> Self {
        RentalDates {
            rent_start_date: Some(start),
            rent_end_date: Some(end),
        }
    }

    /// True when both dates are set.
    pub fn is_resolved(&self) -> bool {
        self.rent_start_date.is_some() && self.rent_end_date.is_some()
    }

    /// Walks the state machine for the line identified by `resource_id`.
    ///
    /// ## Returns
    /// - `Ok(None)` - nothing picked yet (pending)
    /// - `Ok(Some(range))` - validated range
    /// - `Err(IncompleteBooking)` - exactly one date picked
    /// - `Err(InvalidRange)` - end before start
    pub fn resolve(&self, resource_id: &str) -> Result<Option<DateRange>, PricingError> {
        match (self.rent_start_date, self.rent_end_date) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => DateRange::new(start, end).map(Some).map_err(|_| {
                PricingError::InvalidRange {
                    resource_id: resource_id.to_string(),
                    start,
                    end,
                }
            }),
            _ => Err(PricingError::IncompleteBooking {
                resource_id: resource_id.to_string(),
            }),
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// What kind of resource a line refers to. Dates exist only on cameras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "resourceType", rename_all = "lowercase")]
pub enum LineItemKind {
    Camera(RentalDates),
    Accessory,
    Freelancer,
    Package,
}

impl LineItemKind {
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            LineItemKind::Camera(_) => ResourceType::Camera,
            LineItemKind::Accessory => ResourceType::Accessory,
            LineItemKind::Freelancer => ResourceType::Freelancer,
            LineItemKind::Package => ResourceType::Package,
        }
    }
}

fn default_quantity() -> i64 {
    1
}

/// One entry in a user's in-progress order.
///
/// Identity is `(resource_id, resource_type)`; the cart never holds two
/// lines with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub resource_id: String,

    /// Display name, frozen when the item was added.
    pub name: String,

    /// Per-day rate for cameras, flat price otherwise.
    pub unit_price: Money,

    /// Multiplier; hours for freelancers.
    #[serde(default = "default_quantity")]
    pub quantity: i64,

    pub resource: LineItemKind,
}

impl CartLineItem {
    fn with_kind(resource_id: impl Into<String>, name: impl Into<String>, unit_price: Money, resource: LineItemKind) -> Self {
        CartLineItem {
            resource_id: resource_id.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            resource,
        }
    }

    /// A camera line with no dates picked.
    pub fn camera(resource_id: impl Into<String>, name: impl Into<String>, per_day: Money) -> Self {
        Self::with_kind(resource_id, name, per_day, LineItemKind::Camera(RentalDates::none()))
    }

    pub fn accessory(resource_id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self::with_kind(resource_id, name, price, LineItemKind::Accessory)
    }

    pub fn freelancer(resource_id: impl Into<String>, name: impl Into<String>, hourly: Money) -> Self {
        Self::with_kind(resource_id, name, hourly, LineItemKind::Freelancer)
    }

    pub fn package(resource_id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self::with_kind(resource_id, name, price, LineItemKind::Package)
    }

    /// Sets rental dates. No effect on non-camera lines.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        if let LineItemKind::Camera(dates) = &mut self.resource {
            dates.rent_start_date = start;
            dates.rent_end_date = end;
        }
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    #[inline]
    pub fn resource_type(&self) -> ResourceType {
        self.resource.resource_type()
    }

    /// Rental dates for camera lines, `None` for flat-price lines.
    pub fn rental_dates(&self) -> Option<&RentalDates> {
        match &self.resource {
            LineItemKind::Camera(dates) => Some(dates),
            _ => None,
        }
    }

    pub fn rental_dates_mut(&mut self) -> Option<&mut RentalDates> {
        match &mut self.resource {
            LineItemKind::Camera(dates) => Some(dates),
            _ => None,
        }
    }

    /// Whether this line has the given cart identity.
    #[inline]
    pub fn is_same_entry(&self, resource_id: &str, resource_type: ResourceType) -> bool {
        self.resource_id == resource_id && self.resource_type() == resource_type
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered collection of line items; insertion order is display order.
///
/// The cart belongs to one session. Operations in [`crate::pricing`]
/// return a new cart rather than mutating shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Cart { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds the line with the given identity.
    pub fn find(&self, resource_id: &str, resource_type: ResourceType) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|i| i.is_same_entry(resource_id, resource_type))
    }

    pub(crate) fn find_mut(&mut self, resource_id: &str, resource_type: ResourceType) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|i| i.is_same_entry(resource_id, resource_type))
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// =============================================================================
// Payment Method & Order Status
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery; no gateway involved.
    #[serde(rename = "cod")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cod"))]
    CashOnDelivery,
    /// UPI collect request through the payment gateway.
    Upi,
}

impl PaymentMethod {
    pub const fn requires_gateway(&self) -> bool {
        matches!(self, PaymentMethod::Upi)
    }
}

/// Lifecycle of a placed order. Transitions after `Pending` are driven by
/// the payment collaborator or an admin, never by pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

// =============================================================================
// Unit Tests
// =============================================================================
