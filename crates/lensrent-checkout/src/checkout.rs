//! # Checkout Service
//!
//! Turns a session cart into a placed rental order.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. VALIDATE (no I/O)                                                   │
//! │     cart not empty, line prices and quantities, payment details, every  │
//! │     camera line resolved and within max_rent_days                       │
//! │                                                                         │
//! │  2. RE-CHECK AVAILABILITY                                               │
//! │     fresh bookings per camera ──► validate_candidate_range              │
//! │                                                                         │
//! │  3. PRICE                                                               │
//! │     cart_total + prepare_order_lines                                    │
//! │                                                                         │
//! │  4. PERSIST (status: pending)                                           │
//! │     order + lines + one booking per camera line                         │
//! │                                                                         │
//! │  5. PAY (UPI only)                                                      │
//! │     Paid ──► confirmed │ Declined/Err ──► cancelled, bookings released, │
//! │                                           cart kept                     │
//! │                                                                         │
//! │  6. CLEAR CART                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 2 and 4 are separate round trips, so a concurrent checkout for the
//! same camera can still land between them.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::CartState;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::payment::{PaymentGateway, PaymentOutcome};
use crate::sources::{BookingSource, OrderSink};
use lensrent_core::availability::validate_candidate_range;
use lensrent_core::order::{prepare_order_lines, PaymentRequest, RentalOrder};
use lensrent_core::pricing::{validate_lines, CartSummary};
use lensrent_core::validation::{validate_rent_days, ValidationResult};
use lensrent_core::{
    AvailabilityChecker, Cart, DateRange, Money, OrderStatus, PaymentMethod, ResourceType,
    ValidationError,
};

/// What the checkout form submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: String,
    pub user_email: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub upi_id: Option<String>,
}

/// Returned after an order has been placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub status: OrderStatus,
    pub total: Money,
    /// Gateway transaction id for UPI orders.
    pub payment_reference: Option<String>,
}

/// Checkout orchestration over the three collaborators.
#[derive(Debug, Clone)]
pub struct CheckoutService<B, O, P> {
    bookings: B,
    orders: O,
    gateway: P,
    config: CheckoutConfig,
}

impl<B, O, P> CheckoutService<B, O, P>
where
    B: BookingSource,
    O: OrderSink,
    P: PaymentGateway,
{
    pub fn new(bookings: B, orders: O, gateway: P, config: CheckoutConfig) -> Self {
        CheckoutService {
            bookings,
            orders,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Loads a camera's bookings for the date picker.
    pub async fn availability(&self, resource_id: &str) -> CheckoutResult<AvailabilityChecker> {
        let bookings = self.bookings.bookings_for(resource_id).await?;
        debug!(resource_id = %resource_id, bookings = bookings.len(), "Availability loaded");
        Ok(AvailabilityChecker::new(resource_id, bookings))
    }

    /// Commits a date picker selection to the cart.
    ///
    /// Fails with `NotInCart` when the cart has no line for `camera_id`.
    /// A complete selection is checked against fresh bookings and the rental
    /// length limit first; partial selections are stored as-is and surface
    /// as pending or incomplete when the cart is priced.
    pub async fn select_rental_dates(
        &self,
        cart: &CartState,
        camera_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CheckoutResult<CartSummary> {
        if !cart.with_cart(|c| c.find(camera_id, ResourceType::Camera).is_some()) {
            return Err(CheckoutError::NotInCart {
                resource_id: camera_id.to_string(),
            });
        }

        if let (Some(_), Some(_)) = (start, end) {
            let checker = self.availability(camera_id).await?;
            let range = checker.validate(start, end)?;
            validate_rent_days(&range, self.config.max_rent_days)?;
        }

        Ok(cart.set_dates(camera_id, start, end))
    }

    /// Places an order for everything in the cart.
    ///
    /// ## Errors
    /// - `Core` - empty cart, bad payment details, unresolved or too-long
    ///   rentals, or dates taken since they were picked; nothing is stored
    /// - `PaymentMethodUnavailable` - UPI chosen while disabled
    /// - `Storage` - the booking source or order sink failed
    /// - `PaymentFailed` - the order is cancelled, its bookings released and
    ///   the cart kept, so the customer can retry the same dates
    pub async fn place_order(
        &self,
        cart_state: &CartState,
        request: CheckoutRequest,
    ) -> CheckoutResult<CheckoutReceipt> {
        let cart = cart_state.snapshot();

        // 1. Validate
        if !self.config.payment_methods().contains(&request.payment_method) {
            return Err(CheckoutError::PaymentMethodUnavailable {
                method: request.payment_method,
            });
        }
        validate_lines(&cart)?;
        validate_email(&request.user_email)?;
        let payment = PaymentRequest::for_cart(&cart, request.payment_method, request.upi_id.as_deref())?;
        let rentals = camera_rentals(&cart)?;
        for (_, range) in &rentals {
            validate_rent_days(range, self.config.max_rent_days)?;
        }

        // 2. Re-check availability against fresh bookings
        for (camera_id, range) in &rentals {
            let existing = self.bookings.bookings_for(camera_id).await?;
            validate_candidate_range(Some(range.start()), Some(range.end()), &existing).map_err(|e| {
                info!(camera_id = %camera_id, error = %e, "Checkout rejected: dates taken");
                e
            })?;
        }

        // 3. Price
        let lines = prepare_order_lines(&cart)?;

        // 4. Persist
        let order = RentalOrder {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            user_email: request.user_email.trim().to_string(),
            payment_method: payment.method,
            upi_id: payment.upi_id.clone(),
            status: OrderStatus::Pending,
            total: payment.amount,
            created_at: Utc::now(),
            lines,
        };
        self.orders.place(&order).await?;

        info!(
            order_id = %order.id,
            total = %self.config.format_money(order.total),
            method = ?order.payment_method,
            "Order placed"
        );

        // 5. Pay
        let mut receipt = CheckoutReceipt {
            order_id: order.id.clone(),
            status: OrderStatus::Pending,
            total: order.total,
            payment_reference: None,
        };

        if payment.method.requires_gateway() {
            let reason = match self.gateway.collect(&payment).await {
                Ok(PaymentOutcome::Paid { reference }) => {
                    self.orders.set_status(&order.id, OrderStatus::Confirmed).await?;
                    receipt.status = OrderStatus::Confirmed;
                    receipt.payment_reference = Some(reference);
                    None
                }
                Ok(PaymentOutcome::Declined { reason }) => Some(reason),
                Err(e) => Some(e.to_string()),
            };

            if let Some(reason) = reason {
                warn!(order_id = %order.id, reason = %reason, "Payment failed, releasing bookings");
                self.orders.set_status(&order.id, OrderStatus::Cancelled).await?;
                return Err(CheckoutError::PaymentFailed {
                    order_id: order.id,
                    reason,
                });
            }
        }

        // 6. Clear cart
        cart_state.clear();

        Ok(receipt)
    }
}

/// Every camera line's validated range. Fails on the first unresolved line.
fn camera_rentals(cart: &Cart) -> CheckoutResult<Vec<(String, DateRange)>> {
    let mut rentals = Vec::new();

    for item in &cart.items {
        let Some(dates) = item.rental_dates() else {
            continue;
        };
        match dates.resolve(&item.resource_id)? {
            Some(range) => rentals.push((item.resource_id.clone(), range)),
            None => {
                return Err(lensrent_core::PricingError::IncompleteBooking {
                    resource_id: item.resource_id.clone(),
                }
                .into())
            }
        }
    }

    Ok(rentals)
}

fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentError;
    use lensrent_core::{AvailabilityError, BookingRange, CartLineItem, CoreError};
    use lensrent_db::{Database, DbConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn jul(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[derive(Clone, Copy)]
    enum GatewayMode {
        Pay,
        Decline,
        Unreachable,
    }

    /// Gateway that fails its first `failures` calls in `mode`, then pays.
    #[derive(Clone)]
    struct FakeGateway {
        mode: GatewayMode,
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    impl FakeGateway {
        fn paying() -> Self {
            FakeGateway {
                mode: GatewayMode::Pay,
                failures: 0,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn declining() -> Self {
            FakeGateway {
                mode: GatewayMode::Decline,
                failures: usize::MAX,
                ..FakeGateway::paying()
            }
        }

        fn declining_once() -> Self {
            FakeGateway {
                failures: 1,
                ..FakeGateway::declining()
            }
        }

        fn unreachable_once() -> Self {
            FakeGateway {
                mode: GatewayMode::Unreachable,
                failures: 1,
                ..FakeGateway::paying()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl PaymentGateway for FakeGateway {
        async fn collect(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                match self.mode {
                    GatewayMode::Pay => {}
                    GatewayMode::Decline => {
                        return Ok(PaymentOutcome::Declined {
                            reason: "insufficient funds".to_string(),
                        })
                    }
                    GatewayMode::Unreachable => {
                        return Err(PaymentError::Unavailable("timed out".to_string()))
                    }
                }
            }
            Ok(PaymentOutcome::Paid {
                reference: format!("txn-{}", request.amount.minor()),
            })
        }
    }

    fn failed_order_id(err: CheckoutError) -> (String, String) {
        match err {
            CheckoutError::PaymentFailed { order_id, reason } => (order_id, reason),
            other => panic!("expected payment failure, got {:?}", other),
        }
    }

    async fn setup(gateway: FakeGateway) -> (Database, CheckoutService<Database, Database, FakeGateway>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.bookings()
            .insert(&BookingRange::new("b1", "cam1", jul(1), jul(5)))
            .await
            .unwrap();
        let service = CheckoutService::new(db.clone(), db.clone(), gateway, CheckoutConfig::default());
        (db, service)
    }

    fn camera_cart(start: NaiveDate, end: NaiveDate) -> CartState {
        let state = CartState::new();
        state
            .add_item(CartLineItem::camera("cam1", "Canon R6", Money::from_major(500)))
            .unwrap();
        state.set_dates("cam1", Some(start), Some(end));
        state
    }

    fn cod() -> CheckoutRequest {
        CheckoutRequest {
            user_id: "u1".to_string(),
            user_email: "asha@example.com".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            upi_id: None,
        }
    }

    fn upi(upi_id: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            payment_method: PaymentMethod::Upi,
            upi_id: upi_id.map(str::to_string),
            ..cod()
        }
    }

    #[tokio::test]
    async fn test_overlapping_checkout_persists_nothing() {
        let (db, service) = setup(FakeGateway::paying()).await;
        let cart = camera_cart(jul(5), jul(8));

        let err = service.place_order(&cart, cod()).await.unwrap_err();
        match err {
            CheckoutError::Core(CoreError::Availability(AvailabilityError::Overlap { conflicting })) => {
                assert_eq!(conflicting.id, "b1");
            }
            other => panic!("expected overlap, got {:?}", other),
        }

        assert!(db.orders().list_all().await.unwrap().is_empty());
        assert_eq!(db.bookings().count().await.unwrap(), 1);
        assert!(!cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_free_dates_place_order_and_booking() {
        let (db, service) = setup(FakeGateway::paying()).await;
        let cart = camera_cart(jul(6), jul(8));

        let receipt = service.place_order(&cart, cod()).await.unwrap();
        assert_eq!(receipt.total, Money::from_major(1500));
        assert_eq!(receipt.status, OrderStatus::Pending);
        assert!(cart.snapshot().is_empty());

        let stored = db.orders().get_by_id(&receipt.order_id).await.unwrap().unwrap();
        assert_eq!(stored.lines.len(), 1);
        assert_eq!(stored.payment_method, PaymentMethod::CashOnDelivery);

        let bookings = db.bookings().list_for_resource("cam1").await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[1].start_date, Some(jul(6)));
        assert_eq!(bookings[1].end_date, Some(jul(8)));

        // The same dates are now taken for the next customer
        let again = camera_cart(jul(8), jul(9));
        assert!(service.place_order(&again, cod()).await.is_err());
    }

    #[tokio::test]
    async fn test_upi_without_id_fails_before_io() {
        let gateway = FakeGateway::paying();
        let (db, service) = setup(gateway.clone()).await;
        let cart = camera_cart(jul(6), jul(8));

        let err = service.place_order(&cart, upi(None)).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(gateway.calls(), 0);
        assert!(db.orders().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upi_paid_confirms_order() {
        let gateway = FakeGateway::paying();
        let (db, service) = setup(gateway.clone()).await;
        let cart = camera_cart(jul(6), jul(8));

        let receipt = service.place_order(&cart, upi(Some(" asha@okbank "))).await.unwrap();
        assert_eq!(receipt.status, OrderStatus::Confirmed);
        assert_eq!(receipt.payment_reference.as_deref(), Some("txn-150000"));
        assert_eq!(gateway.calls(), 1);

        let stored = db.orders().get_by_id(&receipt.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.upi_id.as_deref(), Some("asha@okbank"));
    }

    #[tokio::test]
    async fn test_upi_declined_cancels_order_and_releases_dates() {
        let (db, service) = setup(FakeGateway::declining()).await;
        let cart = camera_cart(jul(6), jul(8));

        let err = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap_err();
        let (order_id, reason) = failed_order_id(err);
        assert_eq!(reason, "insufficient funds");

        let stored = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(db.bookings().count().await.unwrap(), 1);
        assert!(!cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_decline_succeeds() {
        let gateway = FakeGateway::declining_once();
        let (db, service) = setup(gateway.clone()).await;
        let cart = camera_cart(jul(6), jul(8));

        let err = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap_err();
        let (first_id, _) = failed_order_id(err);

        let receipt = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap();
        assert_eq!(receipt.status, OrderStatus::Confirmed);
        assert_ne!(receipt.order_id, first_id);
        assert_eq!(gateway.calls(), 2);
        assert!(cart.snapshot().is_empty());

        // b1 plus the confirmed order's booking; the cancelled one is gone
        let bookings = db.bookings().list_for_resource("cam1").await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert!(bookings.iter().any(|b| b.start_date == Some(jul(6)) && b.end_date == Some(jul(8))));

        let statuses: Vec<_> = db
            .orders()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| (o.id, o.status))
            .collect();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.contains(&(first_id, OrderStatus::Cancelled)));
        assert!(statuses.contains(&(receipt.order_id, OrderStatus::Confirmed)));
    }

    #[tokio::test]
    async fn test_gateway_unavailable_releases_dates_and_allows_retry() {
        let gateway = FakeGateway::unreachable_once();
        let (db, service) = setup(gateway.clone()).await;
        let cart = camera_cart(jul(6), jul(8));

        let err = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap_err();
        let (order_id, reason) = failed_order_id(err);
        assert!(reason.contains("timed out"));

        let stored = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(db.bookings().count().await.unwrap(), 1);
        assert_eq!(cart.snapshot().len(), 1);

        let receipt = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap();
        assert_eq!(receipt.status, OrderStatus::Confirmed);
        assert_eq!(db.bookings().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_restored_cart_with_negative_price_is_rejected_before_io() {
        let gateway = FakeGateway::paying();
        let (db, service) = setup(gateway.clone()).await;
        let cart = CartState::from_cart(Cart::from_items(vec![
            CartLineItem::camera("cam1", "Canon R6", Money::from_major(-500))
                .with_dates(Some(jul(6)), Some(jul(8))),
        ]));

        let err = service.place_order(&cart, upi(Some("asha@okbank"))).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(gateway.calls(), 0);
        assert!(db.orders().list_all().await.unwrap().is_empty());
        assert_eq!(db.bookings().count().await.unwrap(), 1);

        let zero_qty = CartState::from_cart(Cart::from_items(vec![
            CartLineItem::accessory("lens1", "50mm", Money::from_major(200)).with_quantity(0),
        ]));
        let err = service.place_order(&zero_qty, cod()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rent_days_limit() {
        let (_db, service) = setup(FakeGateway::paying()).await;

        // 31 inclusive days
        let too_long = camera_cart(jul(6), NaiveDate::from_ymd_opt(2024, 8, 5).unwrap());
        let err = service.place_order(&too_long, cod()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // 30 inclusive days
        let ok = camera_cart(jul(6), NaiveDate::from_ymd_opt(2024, 8, 4).unwrap());
        let receipt = service.place_order(&ok, cod()).await.unwrap();
        assert_eq!(receipt.total, Money::from_major(500 * 30));
    }

    #[tokio::test]
    async fn test_unresolved_and_empty_carts() {
        let (_db, service) = setup(FakeGateway::paying()).await;

        let err = service.place_order(&CartState::new(), cod()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::EmptyCart)));

        let pending = CartState::new();
        pending
            .add_item(CartLineItem::camera("cam1", "Canon R6", Money::from_major(500)))
            .unwrap();
        let err = service.place_order(&pending, cod()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::Pricing(_))));
    }

    #[tokio::test]
    async fn test_upi_disabled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = CheckoutConfig {
            upi_enabled: false,
            ..CheckoutConfig::default()
        };
        let service = CheckoutService::new(db.clone(), db, FakeGateway::paying(), config);

        let err = service
            .place_order(&camera_cart(jul(6), jul(8)), upi(Some("asha@okbank")))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentMethodUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_select_rental_dates() {
        let (_db, service) = setup(FakeGateway::paying()).await;
        let cart = CartState::new();
        cart.add_item(CartLineItem::camera("cam1", "Canon R6", Money::from_major(500)))
            .unwrap();

        // Partial selection is stored unchecked
        let summary = service
            .select_rental_dates(&cart, "cam1", Some(jul(3)), None)
            .await
            .unwrap();
        assert_eq!(summary.pending_items, 1);

        // Overlapping selection is refused and the cart keeps the old one
        assert!(service
            .select_rental_dates(&cart, "cam1", Some(jul(4)), Some(jul(7)))
            .await
            .is_err());
        let dates = cart.with_cart(|c| c.items[0].rental_dates().copied());
        assert_eq!(dates.and_then(|d| d.rent_start_date), Some(jul(3)));

        let summary = service
            .select_rental_dates(&cart, "cam1", Some(jul(6)), Some(jul(7)))
            .await
            .unwrap();
        assert_eq!(summary.priced_total, Money::from_major(1000));
    }

    #[tokio::test]
    async fn test_select_dates_for_camera_not_in_cart() {
        let (_db, service) = setup(FakeGateway::paying()).await;
        let cart = CartState::new();
        cart.add_item(CartLineItem::accessory("cam2", "Strap", Money::from_major(50)))
            .unwrap();

        for (start, end) in [(Some(jul(6)), Some(jul(7))), (Some(jul(6)), None)] {
            let err = service
                .select_rental_dates(&cart, "cam2", start, end)
                .await
                .unwrap_err();
            assert!(matches!(err, CheckoutError::NotInCart { ref resource_id } if resource_id == "cam2"));
        }
        assert_eq!(cart.summary().item_count, 1);
    }

    #[tokio::test]
    async fn test_availability() {
        let (_db, service) = setup(FakeGateway::paying()).await;
        let checker = service.availability("cam1").await.unwrap();
        assert_eq!(checker.disabled_dates().len(), 5);
        assert_eq!(checker.first_available_from(jul(1), 3), Some(jul(6)));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email("  ").is_err());
        assert!(validate_email("asha").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
