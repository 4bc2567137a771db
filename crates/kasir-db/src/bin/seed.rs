//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and one demo sale.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir.db (or $KASIR_DATABASE_PATH) with up to 60 products
//! cargo run -p kasir-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p kasir-db --bin seed -- --count 20 --db ./data/kasir.db
//! ```
//!
//! ## What It Does
//! 1. Applies migrations
//! 2. If the catalog is empty, inserts categories and products
//! 3. Runs one checkout against the first two products in stock
//! 4. Prints today's report, also as the JSON a `/report/today` handler returns

use std::env;

use kasir_core::{CategoryInput, CheckoutItem, ProductInput};
use kasir_db::{Database, KasirConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Categories with their products and base prices (Rupiah).
const CATALOG: &[(&str, &str, &[(&str, i64)])] = &[
    (
        "Minuman",
        "Minuman panas dan dingin",
        &[
            ("Kopi Hitam", 5000),
            ("Kopi Susu", 8000),
            ("Es Teh Manis", 4000),
            ("Teh Tarik", 7000),
            ("Jus Jeruk", 10000),
            ("Air Mineral", 3000),
        ],
    ),
    (
        "Makanan",
        "Makanan berat",
        &[
            ("Nasi Goreng", 15000),
            ("Mie Goreng", 13000),
            ("Nasi Uduk", 12000),
            ("Soto Ayam", 14000),
            ("Bakso", 15000),
        ],
    ),
    (
        "Camilan",
        "Camilan dan kue",
        &[
            ("Pisang Goreng", 2000),
            ("Tahu Isi", 1500),
            ("Keripik Singkong", 6000),
            ("Roti Bakar", 9000),
        ],
    ),
];

/// Size variants and their price add-on.
const SIZES: &[(&str, i64)] = &[("", 0), ("Jumbo", 3000), ("Mini", -1000)];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = KasirConfig::load()?;
    let mut count: usize = 60;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: $KASIR_DATABASE_PATH or ./kasir.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), count, "Seeding database");

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping product seed");
    } else {
        let generated = seed_catalog(&db, count).await?;
        info!(generated, "Catalog seeded");
    }

    // Demo sale: two units of the first in-stock product, one of the second.
    let in_stock: Vec<_> = db
        .products()
        .list(None)
        .await?
        .into_iter()
        .filter(|p| p.stock >= 2)
        .take(2)
        .collect();

    for p in &in_stock {
        info!(product = %p.name, price = %p.unit_price(), stock = p.stock, "Demo sale candidate");
    }

    if in_stock.len() == 2 {
        let items = [
            CheckoutItem::new(in_stock[0].id, 2),
            CheckoutItem::new(in_stock[1].id, 1),
        ];
        let sale = db
            .transactions()
            .checkout_with_deadline(&items, config.operation_timeout())
            .await?;
        println!("Demo sale #{}: {}", sale.id, sale.total());
        for line in &sale.details {
            println!("  {} x{}  {}", line.product_name, line.quantity, line.sub_total());
        }
    } else {
        warn!("Not enough stocked products for a demo sale");
    }

    let report = db.reports().today().await?;
    println!();
    println!("Today's report");
    println!("  Revenue:      {}", report.revenue());
    println!("  Transactions: {}", report.total_transaction);
    println!(
        "  Best seller:  {} ({} sold)",
        report.highest_selling.name, report.highest_selling.qty
    );
    println!();
    println!("{}", serde_json::to_string_pretty(&report)?);

    db.close().await;
    Ok(())
}

/// Inserts categories and up to `count` products. Returns the number inserted.
async fn seed_catalog(db: &Database, count: usize) -> Result<usize, Box<dyn std::error::Error>> {
    let mut generated = 0;

    for (category_idx, (name, description, products)) in CATALOG.iter().enumerate() {
        if generated >= count {
            break;
        }

        let category = db
            .categories()
            .create(&CategoryInput {
                name: name.to_string(),
                description: description.to_string(),
            })
            .await?;

        for (product_idx, (product_name, base_price)) in products.iter().enumerate() {
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break;
                }

                let full_name = if size.is_empty() {
                    product_name.to_string()
                } else {
                    format!("{} {}", product_name, size)
                };
                let seed = category_idx * 100 + product_idx * 10 + size_idx;

                db.products()
                    .create(&ProductInput {
                        name: full_name,
                        price: (base_price + addon).max(500),
                        stock: 5 + (seed * 7 % 46) as i64,
                        category_id: Some(category.id),
                    })
                    .await?;
                generated += 1;
            }
        }
    }

    Ok(generated)
}
