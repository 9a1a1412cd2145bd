//! # Booking Repository
//!
//! Confirmed reservations, read per resource for the availability checks.
//!
//! Bookings are immutable once written. Cancellation deletes the row; no
//! query here edits a stored interval.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lensrent_core::{BookingRange, DateRange};

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// All bookings for one resource, in insertion order.
    ///
    /// Rows with missing dates are returned as-is; the core decides to
    /// skip them.
    pub async fn list_for_resource(&self, resource_id: &str) -> DbResult<Vec<BookingRange>> {
        let ranges = sqlx::query_as::<_, BookingRange>(
            r#"
            SELECT id, resource_id, start_date, end_date
            FROM bookings
            WHERE resource_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(resource_id = %resource_id, count = ranges.len(), "Loaded bookings");
        Ok(ranges)
    }

    /// Inserts a booking that is not tied to an order (seed data, admin entry).
    pub async fn insert(&self, booking: &BookingRange) -> DbResult<()> {
        debug!(id = %booking.id, resource_id = %booking.resource_id, "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (id, resource_id, start_date, end_date, order_id, created_at)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.resource_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates and inserts a booking with a fresh id.
    pub async fn create(&self, resource_id: &str, range: DateRange) -> DbResult<BookingRange> {
        let booking = BookingRange::from_range(uuid::Uuid::new_v4().to_string(), resource_id, range);
        self.insert(&booking).await?;
        Ok(booking)
    }

    /// Deletes a booking (cancellation).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Booking", id));
        }

        debug!(id = %id, "Deleted booking");
        Ok(())
    }

    /// Total number of bookings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
