//! # Cart State
//!
//! The session cart for one storefront visitor.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>`. Every mutation runs one of the
//! value-returning operations from `lensrent_core::pricing` and swaps the
//! result in under the lock, so a failed operation leaves the cart as it
//! was.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront Action        CartState              Core Operation         │
//! │  ─────────────────        ─────────              ──────────────         │
//! │                                                                         │
//! │  Add to cart ────────────► add_item() ─────────► try_add_or_increment   │
//! │                                                                         │
//! │  Rent now ───────────────► rent_now() ─────────► try_replace_with_single│
//! │                                                                         │
//! │  Change hours/qty ───────► set_quantity() ─────► set_quantity           │
//! │                                                                         │
//! │  Pick dates ─────────────► set_dates() ────────► select_dates           │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ──────► remove                 │
//! │                                                                         │
//! │  View Cart ──────────────► summary() ──────────► CartSummary::from      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Never hold the lock across an `.await`; take a [`CartState::snapshot`]
//! instead.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use lensrent_core::pricing::{self, CartSummary};
use lensrent_core::{Cart, CartLineItem, CoreResult, ResourceType};

/// Shared handle to a session cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState::default()
    }

    /// Restores a cart persisted by the storefront (e.g. local storage).
    pub fn from_cart(cart: Cart) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(cart)),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let summary = cart_state.with_cart(|cart| CartSummary::from(cart));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // A panic mid-update cannot leave a half-written cart: updates swap whole values.
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    /// Display totals for the cart badge and summary panel.
    pub fn summary(&self) -> CartSummary {
        self.with_cart(|cart| CartSummary::from(cart))
    }

    /// Adds an item, or bumps the quantity of the matching line.
    pub fn add_item(&self, item: CartLineItem) -> CoreResult<CartSummary> {
        self.try_update(|cart| pricing::try_add_or_increment(cart, item))
    }

    /// "Rent now": the cart becomes exactly this item.
    pub fn rent_now(&self, item: CartLineItem) -> CoreResult<CartSummary> {
        self.try_update(|cart| pricing::try_replace_with_single_item(cart, item))
    }

    /// Removes a line; absent lines are ignored.
    pub fn remove_item(&self, resource_id: &str, resource_type: ResourceType) -> CartSummary {
        self.update(|cart| pricing::remove(cart, resource_id, resource_type))
    }

    /// Sets a line's quantity; 0 removes it.
    pub fn set_quantity(
        &self,
        resource_id: &str,
        resource_type: ResourceType,
        quantity: i64,
    ) -> CoreResult<CartSummary> {
        self.try_update(|cart| pricing::set_quantity(cart, resource_id, resource_type, quantity))
    }

    /// Stores the date picker's selection on a camera line, unchecked.
    pub fn set_dates(
        &self,
        camera_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CartSummary {
        self.update(|cart| pricing::select_dates(cart, camera_id, start, end))
    }

    /// Empties the cart.
    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }

    fn update<F>(&self, op: F) -> CartSummary
    where
        F: FnOnce(&Cart) -> Cart,
    {
        self.with_cart_mut(|cart| {
            *cart = op(cart);
            CartSummary::from(&*cart)
        })
    }

    fn try_update<F>(&self, op: F) -> CoreResult<CartSummary>
    where
        F: FnOnce(&Cart) -> CoreResult<Cart>,
    {
        self.with_cart_mut(|cart| {
            *cart = op(cart)?;
            Ok(CartSummary::from(&*cart))
        })
    }
}
