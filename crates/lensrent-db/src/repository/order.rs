//! # Order Repository
//!
//! Rental orders with their lines and the bookings they create.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. PLACE                                                              │
//! │     └── insert_order() → one transaction:                              │
//! │           rental_orders        (status: pending)                       │
//! │           rental_order_lines   (one per cart line, totals frozen)      │
//! │           bookings             (one per camera line)                   │
//! │                                                                         │
//! │  2. PAYMENT (UPI only)                                                 │
//! │     └── update_status() → confirmed                                    │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                  │
//! │     └── update_status() → cancelled, bookings released                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here re-checks overlaps. The caller validates against freshly
//! fetched bookings right before `insert_order`; a concurrent writer can
//! still slip in between.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use lensrent_core::order::{OrderLine, RentalOrder};
use lensrent_core::{Money, OrderStatus, PaymentMethod, ResourceType};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    user_email: String,
    payment_method: PaymentMethod,
    upi_id: Option<String>,
    status: OrderStatus,
    total_minor: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LineRow {
    resource_id: String,
    resource_type: ResourceType,
    name: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    quantity: i64,
    line_total_minor: i64,
}

impl From<LineRow> for OrderLine {
    fn from(row: LineRow) -> Self {
        OrderLine {
            resource_id: row.resource_id,
            resource_type: row.resource_type,
            name: row.name,
            resolved_start_date: row.start_date,
            resolved_end_date: row.end_date,
            quantity: row.quantity,
            line_total: Money::from_minor(row.line_total_minor),
        }
    }
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> RentalOrder {
        RentalOrder {
            id: self.id,
            user_id: self.user_id,
            user_email: self.user_email,
            payment_method: self.payment_method,
            upi_id: self.upi_id,
            status: self.status,
            total: Money::from_minor(self.total_minor),
            created_at: self.created_at,
            lines,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, user_email, payment_method, upi_id, status, total_minor, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for rental order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes an order, its lines, and one booking per camera line in a
    /// single transaction. Either all of it lands or none of it does.
    pub async fn insert_order(&self, order: &RentalOrder) -> DbResult<()> {
        debug!(id = %order.id, lines = order.lines.len(), "Inserting rental order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rental_orders (
                id, user_id, user_email, payment_method, upi_id,
                status, total_minor, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.user_email)
        .bind(order.payment_method)
        .bind(&order.upi_id)
        .bind(order.status)
        .bind(order.total.minor())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO rental_order_lines (
                    order_id, position, resource_id, resource_type, name,
                    start_date, end_date, quantity, line_total_minor
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&line.resource_id)
            .bind(line.resource_type)
            .bind(&line.name)
            .bind(line.resolved_start_date)
            .bind(line.resolved_end_date)
            .bind(line.quantity)
            .bind(line.line_total.minor())
            .execute(&mut *tx)
            .await?;
        }

        for (line, range) in order.camera_rentals() {
            sqlx::query(
                r#"
                INSERT INTO bookings (id, resource_id, start_date, end_date, order_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&line.resource_id)
            .bind(range.start())
            .bind(range.end())
            .bind(&order.id)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %order.id, total = %order.total, "Rental order placed");
        Ok(())
    }

    /// Gets an order with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RentalOrder>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM rental_orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.lines_for(&row.id).await?;
                Ok(Some(row.into_order(lines)))
            }
            None => Ok(None),
        }
    }

    /// Orders placed by one customer, newest first.
    pub async fn list_for_user(&self, user_email: &str) -> DbResult<Vec<RentalOrder>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM rental_orders WHERE user_email = ?1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        self.with_lines(rows).await
    }

    /// Every order, newest first (admin view).
    pub async fn list_all(&self) -> DbResult<Vec<RentalOrder>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM rental_orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_lines(rows).await
    }

    /// Moves an order to a new status.
    ///
    /// Cancelling also deletes the order's bookings so the dates free up.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE rental_orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        if status == OrderStatus::Cancelled {
            sqlx::query("DELETE FROM bookings WHERE order_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(id = %id, status = ?status, "Order status updated");
        Ok(())
    }

    async fn lines_for(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT resource_id, resource_type, name, start_date, end_date,
                   quantity, line_total_minor
            FROM rental_order_lines
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn with_lines(&self, rows: Vec<OrderRow>) -> DbResult<Vec<RentalOrder>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.lines_for(&row.id).await?;
            orders.push(row.into_order(lines));
        }
        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
