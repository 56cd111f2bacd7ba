//! # Seed Data Generator
//!
//! Populates the database with a tea-shop menu and a few weeks of bills, so
//! reports have something to show during development.
//!
//! ## Usage
//! ```bash
//! # Menu plus 14 days of history (default)
//! cargo run -p till-db --bin seed
//!
//! # Longer history
//! cargo run -p till-db --bin seed -- --days 60
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! Bills are built through `InvoiceRequest::finalize`, so seeded totals go
//! through the same arithmetic as live checkouts.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::env;
use till_core::{CatalogItem, InvoiceRequest, LineItem, Money, PaymentMethod, TaxRate};
use till_db::{Database, DbConfig};
use uuid::Uuid;

/// (name, category, price in minor units)
const MENU: &[(&str, &str, i64)] = &[
    ("Tea", "drinks", 2000),
    ("Masala Chai", "drinks", 3000),
    ("Coffee", "drinks", 4000),
    ("Cold Coffee", "drinks", 8000),
    ("Lemon Soda", "drinks", 5000),
    ("Samosa", "snacks", 1500),
    ("Vada Pav", "snacks", 2500),
    ("Bun Maska", "snacks", 3500),
    ("Veg Sandwich", "snacks", 6000),
    ("Chocolate Cake", "bakery", 15000),
    ("Butter Cookies", "bakery", 4500),
    ("Banana Bread", "bakery", 9000),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha", "9876543210"),
    ("Ravi", "+91 98200 12345"),
    ("Meera", "98450-67890"),
    ("Walk-in", "0000000"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 14;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(14);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of bill history to generate (default: 14)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("History:  {} days", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut menu = Vec::with_capacity(MENU.len());
    for (name, category, price) in MENU {
        let item = CatalogItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price: Money::from_cents(*price),
            image: None,
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        };
        db.items().insert(&item).await?;
        menu.push(item);
    }
    println!("✓ Inserted {} menu items", menu.len());

    println!();
    println!("Generating bills...");

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    for day in 0..days.max(0) {
        let bills_today = 3 + (day % 5) as usize;
        for n in 0..bills_today {
            let seed = (day as usize) * 31 + n * 7;
            let created_at = bill_time(now, day, n);
            let request = generate_request(&menu, seed);
            let bill = request.finalize(Uuid::new_v4().to_string(), created_at)?;

            if let Err(e) = db.bills().insert(&bill).await {
                eprintln!("Failed to insert bill {}: {}", bill.id, e);
                continue;
            }
            generated += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} bills in {:?}", generated, elapsed);
    println!("  Total bills in database: {}", db.bills().count().await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Spreads bills over the shop's opening hours, `day` days before `now`.
fn bill_time(now: DateTime<Utc>, day: i64, n: usize) -> DateTime<Utc> {
    let base = now
        .with_hour(3)
        .and_then(|t| t.with_minute(30))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    base - Duration::days(day) + Duration::minutes(45 * n as i64)
}

fn generate_request(menu: &[CatalogItem], seed: usize) -> InvoiceRequest {
    let (name, phone) = CUSTOMERS[seed % CUSTOMERS.len()];

    let lines = 1 + seed % 3;
    let line_items = (0..lines)
        .map(|k| {
            let item = &menu[(seed + k * 5) % menu.len()];
            LineItem::from_catalog(item, 1 + ((seed + k) % 4) as i64)
        })
        .collect::<Vec<_>>();

    let tax_rate = match seed % 3 {
        0 => TaxRate::ZERO,
        1 => TaxRate::from_bps(500),
        _ => TaxRate::from_bps(1800),
    };

    InvoiceRequest {
        customer_name: name.to_string(),
        customer_phone: phone.to_string(),
        tax_rate,
        payment_method: PaymentMethod::ALL[seed % PaymentMethod::ALL.len()],
        line_items,
        request_id: None,
    }
}
