//! # LensRent Admin CLI
//!
//! Read-only views over the rental database.
//!
//! ## Usage
//! ```bash
//! # Disabled dates and next free slot for a camera
//! cargo run -p lensrent-checkout -- availability cam1 --from 2024-07-01 --days 3
//!
//! # Orders placed by a customer
//! cargo run -p lensrent-checkout -- orders asha@example.com
//!
//! # Order counts, live bookings and schema state
//! cargo run -p lensrent-checkout -- stats
//! ```

use std::env;

use chrono::Utc;
use lensrent_checkout::{init_tracing, BookingSource, CheckoutConfig};
use lensrent_core::validation::parse_date;
use lensrent_core::AvailabilityChecker;
use lensrent_db::Database;
use tracing::info;

fn print_help() {
    println!("LensRent Admin CLI");
    println!();
    println!("Usage: lensrent <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  availability <CAMERA_ID>   Show booked days and the next free slot");
    println!("  orders <EMAIL>             List a customer's orders");
    println!("  stats                      Order and booking counts");
    println!();
    println!("Options:");
    println!("  -f, --from <YYYY-MM-DD>    Search start for the next free slot (default: today)");
    println!("  -n, --days <N>             Rental length to look for (default: 1)");
    println!("  -h, --help                 Show this help message");
}

/// Rental length for `--days`: a whole number of days, at least 1.
fn parse_days(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(days) if days >= 1 => Ok(days),
        _ => Err(format!("--days expects a whole number of days >= 1, got '{}'", value)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut positional = Vec::new();
    let mut from = Utc::now().date_naive();
    let mut days: u64 = 1;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--from" | "-f" => {
                if i + 1 < args.len() {
                    from = parse_date("from", &args[i + 1])?;
                    i += 1;
                }
            }
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = parse_days(&args[i + 1])?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let config = CheckoutConfig::from_env()?;
    info!(path = %config.database_path.display(), "Opening database");
    let db = Database::new(config.db_config()).await?;

    match positional.as_slice() {
        [cmd, camera_id] if cmd == "availability" => {
            let checker = AvailabilityChecker::new(camera_id.as_str(), db.bookings_for(camera_id).await?);

            println!("Bookings for {}:", camera_id);
            for booking in checker.bookings() {
                println!("  {}  {}", booking.id, booking);
            }

            let disabled = checker.disabled_dates();
            println!("{} booked days", disabled.len());

            match checker.first_available_from(from, days) {
                Some(start) => println!("Next free {}-day slot starts {}", days, start),
                None => println!("No free {}-day slot in the next year", days),
            }
        }
        [cmd, email] if cmd == "orders" => {
            let orders = db.orders().list_for_user(email).await?;
            println!("{} orders for {}", orders.len(), email);
            for order in orders {
                println!(
                    "  {}  {:?}  {}  {}",
                    order.id,
                    order.status,
                    config.format_money(order.total),
                    order.created_at.format("%Y-%m-%d %H:%M")
                );
                for line in &order.lines {
                    println!(
                        "      {} x{} {}",
                        line.name,
                        line.quantity,
                        config.format_money(line.line_total)
                    );
                }
            }
        }
        [cmd] if cmd == "stats" => {
            let stats = db.stats().await?;
            println!(
                "Orders: {} ({} pending, {} confirmed, {} cancelled)",
                stats.orders(),
                stats.pending_orders,
                stats.confirmed_orders,
                stats.cancelled_orders
            );
            println!("Bookings: {}", stats.bookings);
            println!(
                "Migrations: {}/{}{}",
                stats.migrations_applied,
                stats.migrations_total,
                if stats.schema_current() { "" } else { " (behind)" }
            );
        }
        _ => print_help(),
    }

    db.close().await;
    Ok(())
}
