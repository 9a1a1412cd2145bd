//! # Pricing Module
//!
//! Cart totals across heterogeneous line items, plus the cart mutations
//! the storefront performs.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line type     Formula                          Example                 │
//! │  ─────────     ───────                          ───────                 │
//! │  camera        unit_price × days × quantity     ₹500 × 3 × 1 = ₹1500    │
//! │  accessory     unit_price × quantity            ₹200 × 2     = ₹400     │
//! │  freelancer    unit_price × quantity (hours)    ₹800 × 4     = ₹3200    │
//! │  package       unit_price × quantity            ₹2500 × 1    = ₹2500    │
//! │                                                                         │
//! │  days = end - start + 1   (same-day rental = 1 day)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Gate
//! A camera line with no dates is *pending*: the cart can display it, but
//! [`cart_total`] refuses to produce a number until every camera has a
//! resolved range. Use [`all_dates_resolved`] to enable the checkout
//! button.
//!
//! All mutations take a cart snapshot and return a new one.

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, PricingError};
use crate::money::Money;
use crate::types::{Cart, CartLineItem, LineItemKind, ResourceType};
use crate::validation::{validate_cart_size, validate_price, validate_quantity};

// =============================================================================
// Line Price
// =============================================================================

/// Outcome of pricing a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "amount", rename_all = "lowercase")]
pub enum LinePrice {
    /// Final line total.
    Priced(Money),
    /// Camera line still waiting for its dates.
    Pending,
}

impl LinePrice {
    pub fn amount(&self) -> Option<Money> {
        match self {
            LinePrice::Priced(amount) => Some(*amount),
            LinePrice::Pending => None,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Prices one line.
///
/// ## Returns
/// - `Ok(Priced(total))` - flat lines always; cameras with a valid range
/// - `Ok(Pending)` - camera with neither date set
/// - `Err(IncompleteBooking)` - camera with exactly one date set
/// - `Err(InvalidRange)` - camera whose end precedes its start
/// - `Err(Overflow)` - the product does not fit in [`Money`]
///
/// ```rust
/// use chrono::NaiveDate;
/// use lensrent_core::pricing::line_total;
/// use lensrent_core::{CartLineItem, LinePrice, Money};
///
/// let jun = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
/// let cam = CartLineItem::camera("cam1", "Canon R6", Money::from_major(500))
///     .with_dates(Some(jun(1)), Some(jun(3)));
///
/// assert_eq!(line_total(&cam), Ok(LinePrice::Priced(Money::from_major(1500))));
/// ```
pub fn line_total(item: &CartLineItem) -> Result<LinePrice, PricingError> {
    match &item.resource {
        LineItemKind::Camera(dates) => match dates.resolve(&item.resource_id)? {
            Some(range) => item
                .unit_price
                .checked_mul(range.days())
                .and_then(|per_unit| per_unit.checked_mul(item.quantity))
                .map(LinePrice::Priced)
                .ok_or_else(|| overflow(item)),
            None => Ok(LinePrice::Pending),
        },
        LineItemKind::Accessory | LineItemKind::Freelancer | LineItemKind::Package => item
            .unit_price
            .checked_mul(item.quantity)
            .map(LinePrice::Priced)
            .ok_or_else(|| overflow(item)),
    }
}

fn overflow(item: &CartLineItem) -> PricingError {
    PricingError::Overflow {
        resource_id: item.resource_id.clone(),
    }
}

/// Sum of every line total.
///
/// Fails on the first line that cannot be priced; a pending camera line
/// fails with `IncompleteBooking` instead of contributing zero.
pub fn cart_total(cart: &Cart) -> Result<Money, PricingError> {
    cart.items.iter().try_fold(Money::zero(), |total, item| {
        let amount = match line_total(item)? {
            LinePrice::Priced(amount) => amount,
            LinePrice::Pending => {
                return Err(PricingError::IncompleteBooking {
                    resource_id: item.resource_id.clone(),
                })
            }
        };
        total.checked_add(amount).ok_or_else(|| overflow(item))
    })
}

/// True iff every camera line has both dates set.
///
/// Checkout submission stays disabled until this is true.
pub fn all_dates_resolved(cart: &Cart) -> bool {
    cart.items
        .iter()
        .filter_map(CartLineItem::rental_dates)
        .all(|dates| dates.is_resolved())
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Display totals for the cart page. Never fails: lines that cannot be
/// priced yet are counted in `pending_items` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: usize,
    pub total_quantity: i64,
    /// Sum over priceable lines only.
    pub priced_total: Money,
    pub pending_items: usize,
    pub ready_for_checkout: bool,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let mut priced_total = Money::zero();
        let mut pending_items = 0;

        for item in &cart.items {
            let priced = line_total(item)
                .ok()
                .and_then(|price| price.amount())
                .and_then(|amount| priced_total.checked_add(amount));
            match priced {
                Some(total) => priced_total = total,
                None => pending_items += 1,
            }
        }

        CartSummary {
            item_count: cart.len(),
            total_quantity: cart.items.iter().map(|i| i.quantity).sum(),
            priced_total,
            pending_items,
            ready_for_checkout: !cart.is_empty() && pending_items == 0,
        }
    }
}

// =============================================================================
// Cart Mutations
// =============================================================================

/// Adds a line, or bumps the quantity of the existing line by one.
///
/// First write wins: when the identity is already present the existing
/// line keeps its price, name and dates. A new line always starts at
/// quantity 1, whatever `new_item.quantity` says.
pub fn add_or_increment(cart: &Cart, new_item: CartLineItem) -> Cart {
    let mut next = cart.clone();

    match next.find_mut(&new_item.resource_id, new_item.resource_type()) {
        Some(existing) => existing.quantity += 1,
        None => next.items.push(CartLineItem {
            quantity: 1,
            ..new_item
        }),
    }

    next
}

/// [`add_or_increment`] with the cart limits enforced and the catalog
/// price checked.
pub fn try_add_or_increment(cart: &Cart, new_item: CartLineItem) -> CoreResult<Cart> {
    validate_price(new_item.unit_price)?;

    match cart.find(&new_item.resource_id, new_item.resource_type()) {
        Some(existing) => {
            validate_quantity(existing.quantity + 1).map_err(|_| CoreError::QuantityTooLarge {
                requested: existing.quantity + 1,
                max: crate::MAX_ITEM_QUANTITY,
            })?;
        }
        None => {
            validate_cart_size(cart.len()).map_err(|_| CoreError::CartTooLarge {
                max: crate::MAX_CART_ITEMS,
            })?;
        }
    }

    Ok(add_or_increment(cart, new_item))
}

/// Removes the matching line; absent is a no-op.
pub fn remove(cart: &Cart, resource_id: &str, resource_type: ResourceType) -> Cart {
    Cart::from_items(
        cart.items
            .iter()
            .filter(|i| !i.is_same_entry(resource_id, resource_type))
            .cloned()
            .collect(),
    )
}

/// "Rent now": the cart becomes exactly this one line, at quantity 1.
pub fn replace_with_single_item(_cart: &Cart, item: CartLineItem) -> Cart {
    Cart::from_items(vec![CartLineItem { quantity: 1, ..item }])
}

/// [`replace_with_single_item`] with the catalog price checked.
pub fn try_replace_with_single_item(cart: &Cart, item: CartLineItem) -> CoreResult<Cart> {
    validate_price(item.unit_price)?;
    Ok(replace_with_single_item(cart, item))
}

/// Re-checks every line of a cart that did not come through the mutations
/// above, e.g. one restored from the storefront's local storage.
pub fn validate_lines(cart: &Cart) -> CoreResult<()> {
    if cart.len() > crate::MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        });
    }

    for item in &cart.items {
        validate_price(item.unit_price)?;
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

/// Sets a line's quantity (or freelancer hours).
///
/// Quantity 0 removes the line. Missing lines are left alone.
pub fn set_quantity(
    cart: &Cart,
    resource_id: &str,
    resource_type: ResourceType,
    quantity: i64,
) -> CoreResult<Cart> {
    if quantity == 0 {
        return Ok(remove(cart, resource_id, resource_type));
    }
    validate_quantity(quantity)?;

    let mut next = cart.clone();
    if let Some(item) = next.find_mut(resource_id, resource_type) {
        item.quantity = quantity;
    }
    Ok(next)
}

/// Records the date picker's current selection on a camera line.
///
/// Partial selections are stored as-is; they only become errors when a
/// total is requested. Non-camera or missing lines are left alone.
pub fn select_dates(
    cart: &Cart,
    camera_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Cart {
    let mut next = cart.clone();
    if let Some(dates) = next
        .find_mut(camera_id, ResourceType::Camera)
        .and_then(CartLineItem::rental_dates_mut)
    {
        dates.rent_start_date = start;
        dates.rent_end_date = end;
    }
    next
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn jun(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn camera(start: Option<u32>, end: Option<u32>) -> CartLineItem {
        CartLineItem::camera("cam1", "Canon R6", Money::from_major(500))
            .with_dates(start.map(jun), end.map(jun))
    }

    #[test]
    fn test_same_day_rental_is_one_day() {
        let item = camera(Some(1), Some(1));
        assert_eq!(line_total(&item), Ok(LinePrice::Priced(Money::from_major(500))));
    }

    #[test]
    fn test_three_inclusive_days() {
        let item = camera(Some(1), Some(3));
        assert_eq!(line_total(&item), Ok(LinePrice::Priced(Money::from_major(1500))));

        let two_bodies = item.with_quantity(2);
        assert_eq!(line_total(&two_bodies), Ok(LinePrice::Priced(Money::from_major(3000))));
    }

    #[test]
    fn test_camera_date_states() {
        assert_eq!(line_total(&camera(None, None)), Ok(LinePrice::Pending));
        assert!(matches!(
            line_total(&camera(Some(1), None)),
            Err(PricingError::IncompleteBooking { .. })
        ));
        assert!(matches!(
            line_total(&camera(None, Some(1))),
            Err(PricingError::IncompleteBooking { .. })
        ));
        assert!(matches!(
            line_total(&camera(Some(3), Some(1))),
            Err(PricingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_flat_price_lines() {
        let lens = CartLineItem::accessory("lens1", "50mm f/1.8", Money::from_major(200)).with_quantity(2);
        let shooter = CartLineItem::freelancer("fr1", "Asha", Money::from_major(800)).with_quantity(4);
        let kit = CartLineItem::package("pkg1", "Wedding kit", Money::from_major(2500));

        assert_eq!(line_total(&lens).unwrap().amount(), Some(Money::from_major(400)));
        assert_eq!(line_total(&shooter).unwrap().amount(), Some(Money::from_major(3200)));
        assert_eq!(line_total(&kit).unwrap().amount(), Some(Money::from_major(2500)));
    }

    #[test]
    fn test_cart_total_mixed() {
        let cart = Cart::from_items(vec![
            camera(Some(1), Some(3)),
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)),
            CartLineItem::freelancer("fr1", "Asha", Money::from_major(800)).with_quantity(2),
        ]);
        assert_eq!(cart_total(&cart), Ok(Money::from_major(1500 + 200 + 1600)));
        assert_eq!(cart_total(&Cart::new()), Ok(Money::zero()));
    }

    #[test]
    fn test_pending_camera_blocks_total() {
        let cart = Cart::from_items(vec![
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)),
            camera(None, None),
        ]);
        assert!(!all_dates_resolved(&cart));
        assert_eq!(
            cart_total(&cart),
            Err(PricingError::IncompleteBooking {
                resource_id: "cam1".to_string()
            })
        );
    }

    #[test]
    fn test_all_dates_resolved() {
        assert!(all_dates_resolved(&Cart::new()));

        let flat_only = Cart::from_items(vec![CartLineItem::package("p", "Kit", Money::from_major(1))]);
        assert!(all_dates_resolved(&flat_only));

        let partial = Cart::from_items(vec![camera(Some(1), None)]);
        assert!(!all_dates_resolved(&partial));

        let resolved = Cart::from_items(vec![camera(Some(1), Some(2))]);
        assert!(all_dates_resolved(&resolved));
    }

    #[test]
    fn test_add_twice_increments() {
        let item = CartLineItem::camera("cam1", "Canon R6", Money::from_major(500));
        let cart = add_or_increment(&Cart::new(), item.clone());
        let cart = add_or_increment(&cart, item);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_add_first_write_wins() {
        let original = camera(Some(1), Some(2));
        let cart = add_or_increment(&Cart::new(), original.clone());

        let repriced = CartLineItem::camera("cam1", "Renamed", Money::from_major(9999))
            .with_dates(Some(jun(10)), Some(jun(20)));
        let cart = add_or_increment(&cart, repriced);

        let kept = &cart.items[0];
        assert_eq!(kept.quantity, 2);
        assert_eq!(kept.unit_price, original.unit_price);
        assert_eq!(kept.name, original.name);
        assert_eq!(kept.resource, original.resource);
    }

    #[test]
    fn test_identity_includes_resource_type() {
        let cart = add_or_increment(
            &Cart::new(),
            CartLineItem::camera("x1", "Body", Money::from_major(500)),
        );
        let cart = add_or_increment(&cart, CartLineItem::accessory("x1", "Strap", Money::from_major(50)));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_new_line_starts_at_one() {
        let item = CartLineItem::accessory("lens1", "50mm", Money::from_major(200)).with_quantity(7);
        let cart = add_or_increment(&Cart::new(), item);
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let cart = [
            CartLineItem::package("p1", "A", Money::from_major(1)),
            CartLineItem::accessory("a1", "B", Money::from_major(1)),
            CartLineItem::freelancer("f1", "C", Money::from_major(1)),
        ]
        .into_iter()
        .fold(Cart::new(), |cart, item| add_or_increment(&cart, item));

        let ids: Vec<_> = cart.items.iter().map(|i| i.resource_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "a1", "f1"]);
    }

    #[test]
    fn test_remove() {
        let cart = Cart::from_items(vec![
            camera(None, None),
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)),
        ]);

        let cart = remove(&cart, "cam1", ResourceType::Camera);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].resource_id, "lens1");

        // Absent: no-op
        let same = remove(&cart, "nope", ResourceType::Package);
        assert_eq!(same, cart);
        // Same id, other type: no-op
        let same = remove(&cart, "lens1", ResourceType::Camera);
        assert_eq!(same, cart);
    }

    #[test]
    fn test_replace_with_single_item() {
        let cart = Cart::from_items(vec![
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)),
            CartLineItem::package("pkg1", "Kit", Money::from_major(2500)),
        ]);
        let rent_now = camera(Some(1), Some(2)).with_quantity(3);

        let cart = replace_with_single_item(&cart, rent_now);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].resource_id, "cam1");
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[test]
    fn test_try_add_enforces_limits() {
        let item = CartLineItem::accessory("lens1", "50mm", Money::from_major(200));
        let at_max = Cart::from_items(vec![item.clone().with_quantity(crate::MAX_ITEM_QUANTITY)]);
        assert!(matches!(
            try_add_or_increment(&at_max, item),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        let full = Cart::from_items(
            (0..crate::MAX_CART_ITEMS)
                .map(|n| CartLineItem::package(format!("p{n}"), "Kit", Money::from_major(1)))
                .collect(),
        );
        let extra = CartLineItem::package("one-more", "Kit", Money::from_major(1));
        assert!(matches!(
            try_add_or_increment(&full, extra),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_set_quantity_and_select_dates() {
        let cart = Cart::from_items(vec![camera(None, None)]);

        let cart = select_dates(&cart, "cam1", Some(jun(1)), None);
        assert!(!all_dates_resolved(&cart));

        let cart = select_dates(&cart, "cam1", Some(jun(1)), Some(jun(2)));
        let cart = set_quantity(&cart, "cam1", ResourceType::Camera, 2).unwrap();
        assert_eq!(cart_total(&cart), Ok(Money::from_major(2000)));

        assert!(set_quantity(&cart, "cam1", ResourceType::Camera, -1).is_err());
        let emptied = set_quantity(&cart, "cam1", ResourceType::Camera, 0).unwrap();
        assert!(emptied.is_empty());
    }

    #[test]
    fn test_overflowing_totals_are_errors() {
        let huge = CartLineItem::camera("cam1", "Canon R6", Money::from_minor(i64::MAX))
            .with_dates(Some(jun(1)), Some(jun(2)));
        assert_eq!(
            line_total(&huge),
            Err(PricingError::Overflow {
                resource_id: "cam1".to_string()
            })
        );

        let kit = CartLineItem::package("pkg1", "Kit", Money::from_minor(i64::MAX / 2 + 1)).with_quantity(2);
        assert!(matches!(line_total(&kit), Err(PricingError::Overflow { .. })));

        let lens = CartLineItem::accessory("lens1", "50mm", Money::from_minor(i64::MAX));
        let cart = Cart::from_items(vec![lens.clone(), CartLineItem { resource_id: "lens2".into(), ..lens }]);
        assert_eq!(
            cart_total(&cart),
            Err(PricingError::Overflow {
                resource_id: "lens2".to_string()
            })
        );

        let summary = CartSummary::from(&cart);
        assert_eq!(summary.priced_total, Money::from_minor(i64::MAX));
        assert_eq!(summary.pending_items, 1);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let refund = CartLineItem::accessory("lens1", "50mm", Money::from_major(-200));

        assert!(matches!(
            try_add_or_increment(&Cart::new(), refund.clone()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            try_replace_with_single_item(&Cart::new(), refund),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let free = CartLineItem::package("pkg1", "Promo kit", Money::zero());
        assert_eq!(try_add_or_increment(&Cart::new(), free).unwrap().len(), 1);
    }

    #[test]
    fn test_validate_lines() {
        let ok = Cart::from_items(vec![
            camera(Some(1), Some(2)),
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)),
        ]);
        assert!(validate_lines(&ok).is_ok());

        let negative = Cart::from_items(vec![CartLineItem::accessory("lens1", "50mm", Money::from_major(-1))]);
        assert!(matches!(validate_lines(&negative), Err(CoreError::Validation(_))));

        let zero_qty = Cart::from_items(vec![camera(None, None).with_quantity(0)]);
        assert!(matches!(
            validate_lines(&zero_qty),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let oversized = Cart::from_items(
            (0..=crate::MAX_CART_ITEMS)
                .map(|n| CartLineItem::package(format!("p{n}"), "Kit", Money::from_major(1)))
                .collect(),
        );
        assert!(matches!(validate_lines(&oversized), Err(CoreError::CartTooLarge { .. })));
    }

    #[test]
    fn test_summary_tolerates_pending_lines() {
        let cart = Cart::from_items(vec![
            camera(None, None),
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)).with_quantity(2),
        ]);
        let summary = CartSummary::from(&cart);

        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.priced_total, Money::from_major(400));
        assert_eq!(summary.pending_items, 1);
        assert!(!summary.ready_for_checkout);

        assert!(!CartSummary::from(&Cart::new()).ready_for_checkout);
    }
}
