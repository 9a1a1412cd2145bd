//! # lensrent-db: Database Layer for LensRent
//!
//! Local SQLite storage for bookings and rental orders, using sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LensRent Data Flow                               │
//! │                                                                         │
//! │  CheckoutService::place_order                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   lensrent-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ BookingRepo    │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ OrderRepo      │   │ 001_init.sql │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (lensrent.db)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lensrent_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("lensrent.db")).await?;
//! let ranges = db.bookings().list_for_resource("cam1").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbStats};

pub use repository::booking::BookingRepository;
pub use repository::order::OrderRepository;
