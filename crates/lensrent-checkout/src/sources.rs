//! # Storage Collaborators
//!
//! The two storage seams checkout depends on. [`Database`] implements both;
//! tests substitute their own.

use async_trait::async_trait;
use lensrent_core::order::RentalOrder;
use lensrent_core::{BookingRange, OrderStatus};
use lensrent_db::{Database, DbResult};

/// Supplies the existing bookings for one resource.
///
/// Results are expected to be fresh; callers fetch again right before
/// placing an order.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn bookings_for(&self, resource_id: &str) -> DbResult<Vec<BookingRange>>;
}

/// Persists placed orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Stores the order with its lines and one booking per camera line.
    async fn place(&self, order: &RentalOrder) -> DbResult<()>;

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> DbResult<()>;
}

#[async_trait]
impl BookingSource for Database {
    async fn bookings_for(&self, resource_id: &str) -> DbResult<Vec<BookingRange>> {
        self.bookings().list_for_resource(resource_id).await
    }
}

#[async_trait]
impl OrderSink for Database {
    async fn place(&self, order: &RentalOrder) -> DbResult<()> {
        self.orders().insert_order(order).await
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> DbResult<()> {
        self.orders().update_status(order_id, status).await
    }
}
