//! # Rental Database
//!
//! One SQLite file holds rental orders, their lines, and the bookings that
//! block camera dates. [`Database`] owns the pool and hands out cheap
//! repository handles over it.
//!
//! ## Lifecycle
//! ```text
//! DbConfig::new(path) ──► Database::new(config).await ──► SqlitePool
//!                                   │                        │
//!                                   │                        ├── bookings()
//!                                   │                        └── orders()
//!                                   └── runs embedded migrations
//!
//! Database::open_in_memory() ──► same, on a private ":memory:" database
//! ```
//!
//! ## Concurrent Checkouts
//! WAL lets the date picker read bookings while an order is being written.
//! Two checkouts writing at once serialize on SQLite's write lock; the
//! second waits up to `busy_timeout` instead of failing straight away.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::booking::BookingRepository;
use crate::repository::order::OrderRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the rental database lives and how the pool behaves.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/lensrent/lensrent.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a writer waits for another checkout's transaction to finish.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how long a writer waits on SQLite's write lock.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private in-memory database, used by tests and demos.
    ///
    /// Every connection to `:memory:` gets its own empty database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// Row counts and schema state, for the admin CLI and health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbStats {
    pub pending_orders: i64,
    pub confirmed_orders: i64,
    pub cancelled_orders: i64,
    /// Bookings currently blocking dates, seeded ones included.
    pub bookings: i64,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

impl DbStats {
    pub fn orders(&self) -> i64 {
        self.pending_orders + self.confirmed_orders + self.cancelled_orders
    }

    pub fn schema_current(&self) -> bool {
        self.migrations_applied == self.migrations_total
    }
}

/// Handle to the rental database; clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the rental database.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL, NORMAL synchronous, foreign keys on,
    ///    busy timeout for concurrent checkouts
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening rental database"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default; order lines and bookings cascade
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(if config.is_in_memory() {
                None
            } else {
                Some(config.idle_timeout)
            })
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Migrated in-memory database.
    pub async fn open_in_memory() -> DbResult<Self> {
        Database::new(DbConfig::in_memory()).await
    }

    /// Applies all pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the booking repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let ranges = db.bookings().list_for_resource("cam1").await?;
    /// ```
    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.pool.clone())
    }

    /// Returns the rental order repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Order counts by status, live bookings, and migration progress.
    pub async fn stats(&self) -> DbResult<DbStats> {
        let (migrations_total, migrations_applied) = migrations::migration_status(&self.pool).await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM rental_orders GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = DbStats {
            bookings: self.bookings().count().await?,
            migrations_applied,
            migrations_total,
            ..DbStats::default()
        };
        for (status, count) in by_status {
            match status.as_str() {
                "pending" => stats.pending_orders = count,
                "confirmed" => stats.confirmed_orders = count,
                "cancelled" => stats.cancelled_orders = count,
                other => warn!(status = %other, count, "Unknown order status in rental_orders"),
            }
        }

        Ok(stats)
    }

    /// True when queries run and every embedded migration has been applied.
    pub async fn health_check(&self) -> bool {
        match migrations::migration_status(&self.pool).await {
            Ok((total, applied)) if total == applied => true,
            Ok((total, applied)) => {
                warn!(total, applied, "Rental database schema is behind");
                false
            }
            Err(e) => {
                warn!(error = %e, "Rental database health check failed");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
