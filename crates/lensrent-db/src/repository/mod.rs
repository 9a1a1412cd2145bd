//! # Repository Module
//!
//! ```text
//! CheckoutService
//!      │
//!      │  db.bookings().list_for_resource("cam1")
//!      ▼
//! BookingRepository / OrderRepository ──► SQL ──► SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`booking::BookingRepository`] - Confirmed reservations per resource
//! - [`order::OrderRepository`] - Rental orders with their lines

pub mod booking;
pub mod order;
