//! # Seed Data Generator
//!
//! Populates a ledger database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pembukuan_dev.db with a week of activity (default)
//! cargo run -p pembukuan-db --bin seed
//!
//! # Seed more history
//! cargo run -p pembukuan-db --bin seed -- --days 30
//!
//! # Specify database path
//! cargo run -p pembukuan-db --bin seed -- --db ./data/pembukuan.db
//! ```
//!
//! ## Generated Data
//! - The pempek menu (products with prices and stock)
//! - Three suppliers and a stock row per raw material, some deliberately low
//! - Daily sales and expenses for the last `--days` days
//! - One open receivable and one open payable

use chrono::{Days, Duration, Utc};
use std::env;

use pembukuan_core::{
    Expense, MaterialStock, NewExpense, NewMaterialStock, NewPayable, NewProduct, NewReceivable,
    NewSale, NewSupplier, Payable, PayableStatus, PaymentMethod, Product, Receivable,
    ReceivableStatus, SaleTransaction, Session, Supplier, Table,
};
use pembukuan_db::{Database, DbConfig, Gateway, GatewayExt, Query};

/// Menu items: (name, price in rupiah, stock)
const MENU: &[(&str, i64, i64)] = &[
    ("Pempek Lenjer", 5000, 40),
    ("Pempek Kapal Selam", 7000, 25),
    ("Pempek Adaan", 4000, 30),
    ("Pempek Kulit", 4000, 30),
    ("Pempek Telur Kecil", 3000, 50),
    ("Tekwan", 12000, 15),
    ("Model", 12000, 10),
];

/// Raw materials: (name, quantity, unit)
const MATERIALS: &[(&str, i64, &str)] = &[
    ("Ikan Tenggiri", 18, "Kg"),
    ("Tepung Sagu", 25, "Kg"),
    ("Telur", 6, "Kg"),
    ("Cuka", 4, "Liter"),
    ("Gula Merah", 12, "Kg"),
    ("Minyak Goreng", 0, "Liter"),
];

/// Suppliers: (name, contact, supplied materials)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Toko Ikan Segar", "0812-7000-1111", "Ikan Tenggiri"),
    ("UD Sagu Makmur", "0813-7000-2222", "Tepung Sagu"),
    ("Pasar 16 Ilir", "0711-350000", "Telur, Cuka, Gula Merah"),
];

/// Daily expenses: (category, description, amount)
const DAILY_EXPENSES: &[(&str, &str, i64)] = &[
    ("Gas", "Isi ulang 3 kg", 22000),
    ("Minyak", "Minyak goreng 2 liter", 36000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: u64 = 7;
    let mut db_path = String::from("./pembukuan_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(7);
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
                println!("Pembukuan Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales/expenses to generate (default: 7)");
                println!("  -d, --db <PATH>    Database file path (default: ./pembukuan_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pembukuan Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let gateway = db.gateway();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // The gateway only checks expiry; a short-lived local session is enough here
    let now = Utc::now();
    let session = Session {
        user_id: 0,
        email: "seed@localhost".to_string(),
        access_token: "seed".to_string(),
        expires_at: now + Duration::hours(1),
    };

    let existing = gateway.query(&session, Table::Products, &Query::new().limit(1)).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products = Vec::new();
    for (name, price, stock) in MENU {
        let product: Product = gateway
            .insert_as(
                &session,
                &NewProduct {
                    name: name.to_string(),
                    price: *price,
                    stock: *stock,
                },
            )
            .await?;
        products.push(product);
    }
    println!("✓ {} products", products.len());

    for (name, contact, materials) in SUPPLIERS {
        let _: Supplier = gateway
            .insert_as(
                &session,
                &NewSupplier {
                    name: name.to_string(),
                    contact: Some(contact.to_string()),
                    address: Some("Palembang".to_string()),
                    supplied_materials: Some(materials.to_string()),
                },
            )
            .await?;
    }
    println!("✓ {} suppliers", SUPPLIERS.len());

    for (name, quantity, unit) in MATERIALS {
        let _: MaterialStock = gateway
            .insert_as(
                &session,
                &NewMaterialStock {
                    material_name: name.to_string(),
                    quantity: *quantity,
                    unit: unit.to_string(),
                    updated_at: now,
                },
            )
            .await?;
    }
    println!("✓ {} stock rows", MATERIALS.len());

    let today = now.date_naive();
    let mut sales = 0;
    for offset in 0..days {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };

        for (idx, product) in products.iter().enumerate() {
            let quantity = 1 + ((offset as usize * 7 + idx * 3) % 9) as i64;
            let payment_method = if idx % 3 == 0 {
                PaymentMethod::NonCash
            } else {
                PaymentMethod::Cash
            };

            let _: SaleTransaction = gateway
                .insert_as(
                    &session,
                    &NewSale {
                        date,
                        product_id: Some(product.id),
                        quantity,
                        unit_price: product.price,
                        total: product.price * quantity,
                        payment_method,
                        note: None,
                        created_at: now,
                    },
                )
                .await?;
            sales += 1;
        }

        for (category, description, amount) in DAILY_EXPENSES {
            let _: Expense = gateway
                .insert_as(
                    &session,
                    &NewExpense {
                        date,
                        category: category.to_string(),
                        description: Some(description.to_string()),
                        amount: *amount,
                    },
                )
                .await?;
        }
    }
    println!("✓ {} sales over {} days", sales, days);

    let _: Receivable = gateway
        .insert_as(
            &session,
            &NewReceivable {
                customer_name: "Budi".to_string(),
                amount: 14000,
                transaction_date: today,
                due_date: today.checked_add_days(Days::new(7)),
                status: ReceivableStatus::Unpaid,
            },
        )
        .await?;
    let _: Payable = gateway
        .insert_as(
            &session,
            &NewPayable {
                counterparty_name: "UD Sagu Makmur".to_string(),
                amount: 750000,
                loan_date: today,
                due_date: today.checked_add_days(Days::new(14)),
                status: PayableStatus::Unpaid,
            },
        )
        .await?;
    println!("✓ 1 receivable, 1 payable");

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
