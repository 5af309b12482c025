//! # Seed Data Generator
//!
//! Populates a database with a development catalog.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount into a specific file
//! cargo run -p stockroom-db --bin seed -- --count 2000 --db ./data/stockroom.db
//! ```
//!
//! Names are `{base} {variant}`, unique case-insensitively. Prices run from
//! 0.99 to just under 50.00 and quantities from 0 to 60, so roughly one product in ten
//! is low stock.

use anyhow::Context;
use std::env;
use stockroom_core::{Money, NewProduct, Product, ProductStore, StoreError};
use stockroom_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 500;
const DEFAULT_DB: &str = "./stockroom_dev.db";

const BASES: &[&str] = &[
    "Hex Bolt",
    "Carriage Bolt",
    "Wood Screw",
    "Machine Screw",
    "Wing Nut",
    "Lock Washer",
    "Flat Washer",
    "Cotter Pin",
    "Hinge",
    "Drawer Slide",
    "Cable Tie",
    "Hose Clamp",
    "Wall Anchor",
    "Shelf Bracket",
    "Eye Hook",
    "Spring Clip",
    "Pipe Fitting",
    "O-Ring",
    "Bearing",
    "Sprocket",
    "Pulley",
    "Caster Wheel",
    "Padlock",
    "Door Knob",
    "Light Switch",
];

/// Variant label and price bump in cents.
const VARIANTS: &[(&str, i64)] = &[
    ("M3", 0),
    ("M4", 25),
    ("M5", 50),
    ("M6", 75),
    ("M8", 120),
    ("M10", 180),
    ("Small", 0),
    ("Medium", 150),
    ("Large", 300),
    ("Stainless", 400),
    ("Brass", 550),
    ("Zinc", 90),
    ("10-Pack", 600),
    ("25-Pack", 1200),
    ("50-Pack", 2000),
    ("Bulk", 2500),
    ("Black", 60),
    ("White", 60),
    ("Heavy Duty", 800),
    ("Mini", 0),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path = String::from(DEFAULT_DB);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value
                        .parse()
                        .with_context(|| format!("invalid --count value: {value}"))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let capacity = BASES.len() * VARIANTS.len();
    if count > capacity {
        warn!(requested = count, capacity, "Count exceeds unique names; clamping");
        count = capacity;
    }

    info!(db = %db_path, count, "Seeding catalog");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open {db_path}"))?;
    let store = db.products();

    let existing = store.count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Catalog already has products; skipping seed. Delete the database file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    for seed in 0..count {
        let product = generate_product(seed)?;

        match store.add(&product).await {
            Ok(_) => generated += 1,
            Err(StoreError::Duplicate { field, value }) => {
                warn!(%field, %value, "Skipping duplicate");
                continue;
            }
            Err(e) => return Err(e).context("insert failed"),
        }

        if generated > 0 && generated % 100 == 0 {
            info!(generated, "Progress");
        }
    }

    let elapsed = start.elapsed();
    info!(
        generated,
        elapsed_ms = elapsed.as_millis() as u64,
        rate = %format!("{:.0}/s", generated as f64 / elapsed.as_secs_f64().max(f64::EPSILON)),
        "Seed complete"
    );

    let value = store.sum_price_times_quantity().await?;
    let top = store.max_by_price().await?;
    info!(
        inventory_value = %value,
        most_expensive = top.as_ref().map(Product::name).unwrap_or("-"),
        "Catalog summary"
    );

    db.close().await;
    Ok(())
}

/// Deterministic product number `seed`.
fn generate_product(seed: usize) -> anyhow::Result<Product> {
    let base = BASES[seed % BASES.len()];
    let (variant, bump) = VARIANTS[(seed / BASES.len()) % VARIANTS.len()];

    // 0.99 - 24.99 before the variant bump
    let base_cents = 99 + ((seed * 37) % 2400) as i64;
    let quantity = ((seed * 13) % 61) as i64;

    let new = NewProduct::new(
        format!("{base} {variant}"),
        Money::from_cents(base_cents + bump),
        quantity,
    );
    Ok(Product::create(&new)?)
}
