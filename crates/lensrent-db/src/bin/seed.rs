//! # Seed Data Generator
//!
//! Populates the database with demo bookings so the date picker has
//! something to grey out during development.
//!
//! ## Usage
//! ```bash
//! # Seed ./lensrent_dev.db with bookings starting today
//! cargo run -p lensrent-db --bin seed
//!
//! # Specify database path
//! cargo run -p lensrent-db --bin seed -- --db ./data/lensrent.db
//! ```
//!
//! ## Generated Bookings
//! Each demo camera gets a few non-overlapping reservations spread over the
//! next two months. Offsets are relative to the day the seed runs.

use chrono::{Duration, Utc};
use lensrent_core::DateRange;
use lensrent_db::{Database, DbConfig};
use std::env;

/// (camera id, [(start offset, length in days)])
const DEMO_BOOKINGS: &[(&str, &[(i64, i64)])] = &[
    ("cam1", &[(2, 4), (10, 3), (21, 7)]),
    ("cam2", &[(0, 2), (5, 5)]),
    ("cam3", &[(14, 10)]),
    ("cam4", &[(1, 1), (3, 1), (5, 1), (30, 14)]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./lensrent_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("LensRent Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./lensrent_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 LensRent Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.bookings().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} bookings", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating bookings...");

    let today = Utc::now().date_naive();
    let mut generated = 0;

    for (camera_id, spans) in DEMO_BOOKINGS {
        for (offset, length) in spans.iter() {
            let start = today + Duration::days(*offset);
            let end = start + Duration::days(length - 1);
            let range = DateRange::new(start, end)?;

            match db.bookings().create(camera_id, range).await {
                Ok(_) => generated += 1,
                Err(e) => eprintln!("Failed to insert booking for {}: {}", camera_id, e),
            }
        }

        let disabled: usize = db
            .bookings()
            .list_for_resource(camera_id)
            .await?
            .iter()
            .filter_map(|b| b.endpoints())
            .map(|(s, e)| ((e - s).num_days() + 1) as usize)
            .sum();
        println!("  {}: {} days blocked", camera_id, disabled);
    }

    println!();
    println!("✓ Generated {} bookings", generated);
    println!("✓ Seed complete!");

    Ok(())
}
