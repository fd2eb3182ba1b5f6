//! # Seed Data Generator
//!
//! Populates the database with a demo pharmacy catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./medistock_dev.db
//! cargo run -p medistock-db --bin seed
//!
//! # Specify database path
//! cargo run -p medistock-db --bin seed -- --db ./data/medistock.db
//! ```
//!
//! Creates a handful of suppliers and, for each catalog entry, a medicine
//! with an opening stock receipt. Users are not seeded: the first account
//! registered through the API becomes the administrator.

use std::env;

use medistock_core::{NewMedicine, NewSupplier, StockReceipt};
use medistock_db::{Database, DbConfig};

/// (code, name, category, manufacturer, price cents, opening stock, reorder threshold)
const CATALOG: &[(&str, &str, &str, &str, i64, i64, i64)] = &[
    ("AMOX-500", "Amoxicillin 500mg", "Antibiotics", "Sandoz", 450, 120, 20),
    ("AZI-250", "Azithromycin 250mg", "Antibiotics", "Pfizer", 1290, 40, 10),
    ("CIPRO-500", "Ciprofloxacin 500mg", "Antibiotics", "Bayer", 880, 8, 10),
    ("IBU-200", "Ibuprofen 200mg", "Analgesics", "Advil", 199, 300, 50),
    ("PARA-500", "Paracetamol 500mg", "Analgesics", "GSK", 149, 500, 100),
    ("NAPRO-250", "Naproxen 250mg", "Analgesics", "Bayer", 399, 0, 15),
    ("LORA-10", "Loratadine 10mg", "Antihistamines", "Claritin", 650, 75, 15),
    ("CETI-10", "Cetirizine 10mg", "Antihistamines", "Zyrtec", 590, 12, 15),
    ("OMEP-20", "Omeprazole 20mg", "Gastro", "AstraZeneca", 720, 90, 20),
    ("ORS-SACH", "Oral Rehydration Salts", "Gastro", "WHO", 99, 200, 40),
    ("METF-500", "Metformin 500mg", "Diabetes", "Merck", 310, 150, 30),
    ("VITC-1000", "Vitamin C 1000mg", "Supplements", "Nature Made", 899, 60, 10),
];

/// (name, contact, email, phone)
const SUPPLIERS: &[(&str, &str, &str, &str)] = &[
    ("Central Pharma Distribution", "Ana Lopes", "orders@centralpharma.example", "+1 555 0100"),
    ("MedSupply Wholesale", "Tom Reyes", "sales@medsupply.example", "+1 555 0142"),
    ("HealthLine Logistics", "Priya Shah", "hello@healthline.example", "+1 555 0177"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./medistock_dev.db");

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
                println!("MediStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./medistock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("MediStock Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.medicines().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} medicines", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, contact, email, phone) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: name.to_string(),
                contact_name: Some(contact.to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                address: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ Created {} suppliers", supplier_ids.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (index, (code, name, category, manufacturer, price, opening, threshold)) in
        CATALOG.iter().enumerate()
    {
        let medicine = match db
            .medicines()
            .create(&NewMedicine {
                code: code.to_string(),
                name: name.to_string(),
                unit_price_cents: *price,
                manufacturer: Some(manufacturer.to_string()),
                category: Some(category.to_string()),
                description: None,
                reorder_threshold: Some(*threshold),
            })
            .await
        {
            Ok(medicine) => medicine,
            Err(e) => {
                eprintln!("Failed to insert {}: {}", code, e);
                continue;
            }
        };

        if *opening > 0 {
            let receipt = StockReceipt {
                quantity: *opening,
                supplier_id: supplier_ids.get(index % supplier_ids.len().max(1)).cloned(),
                reference: Some(format!("SEED-{:03}", index + 1)),
            };
            db.stock().receive(&medicine.id, &receipt, None).await?;
        }

        generated += 1;
    }

    println!("✓ Created {} medicines in {:?}", generated, start.elapsed());

    let low = db.reports().low_stock().await?;
    println!("  {} medicines at or below reorder threshold", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
