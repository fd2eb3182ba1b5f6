//! # medistock-db: Database Layer for MediStock
//!
//! This crate provides database access for the MediStock service.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediStock Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales/)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   medistock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MedicineRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StockRepo     │    │ 001_initial  │  │   │
//! │  │   │ StockLocks    │    │ SaleRepo      │    │   _schema    │  │   │
//! │  │   │ RetryPolicy   │    │ ReportRepo …  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`locks`] - Per-medicine stock locks
//! - [`retry`] - Conflict retry with jittered backoff
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medistock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("medistock.db")).await?;
//! let sale = db.sales().create_sale(&cashier_id, &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod locks;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use locks::StockLocks;
pub use pool::{Database, DbConfig};
pub use retry::RetryPolicy;

// Repository re-exports for convenience
pub use repository::medicine::MedicineRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::{NewUserRecord, UserRepository};
