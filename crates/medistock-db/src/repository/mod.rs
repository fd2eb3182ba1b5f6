//! # Repository Module
//!
//! Database repository implementations for MediStock.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().create_sale(&cashier, &request)                     │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── validate (medistock-core)                                         │
//! │  ├── lock medicines (StockLocks)                                       │
//! │  ├── plan (medistock-core)                                             │
//! │  └── write in one transaction                                          │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MedicineRepository`](medicine::MedicineRepository) - Catalog CRUD and listing
//! - [`StockRepository`](stock::StockRepository) - Stock levels, receipts, adjustments, ledger
//! - [`SupplierRepository`](supplier::SupplierRepository) - Supplier CRUD and listing
//! - [`SaleRepository`](sale::SaleRepository) - Sale transaction workflow and history
//! - [`UserRepository`](user::UserRepository) - Accounts for authentication
//! - [`ReportRepository`](report::ReportRepository) - Read-only aggregates

use uuid::Uuid;

pub mod medicine;
pub mod report;
pub mod sale;
pub mod stock;
pub mod supplier;
pub mod user;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared fixtures for repository tests.
#[cfg(test)]
pub(crate) mod test_support {
    use medistock_core::{Medicine, NewMedicine, Role, User};

    use crate::pool::{Database, DbConfig};
    use crate::repository::user::NewUserRecord;

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn medicine(db: &Database, code: &str, price_cents: i64, quantity: i64) -> Medicine {
        let medicine = db
            .medicines()
            .create(&NewMedicine {
                code: code.to_string(),
                name: format!("{} tablets", code),
                unit_price_cents: price_cents,
                ..Default::default()
            })
            .await
            .unwrap();

        if quantity > 0 {
            db.stock()
                .receive(
                    &medicine.id,
                    &medistock_core::StockReceipt {
                        quantity,
                        supplier_id: None,
                        reference: Some("opening balance".to_string()),
                    },
                    None,
                )
                .await
                .unwrap();
        }

        medicine
    }

    pub async fn user(db: &Database, username: &str, role: Role) -> User {
        db.users()
            .create(&NewUserRecord {
                username: username.to_string(),
                password_hash: "$argon2id$test".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    pub async fn quantity(db: &Database, medicine_id: &str) -> i64 {
        db.stock().get(medicine_id).await.unwrap().quantity
    }
}
