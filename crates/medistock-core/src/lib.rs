//! # medistock-core: Pure Business Logic for MediStock
//!
//! This crate holds the pharmacy domain as pure functions and plain types,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (browser)                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medistock-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │ validation│  │   │
//! │  │   │ Medicine  │  │   Money   │  │ SalePlan  │  │   rules   │  │   │
//! │  │   │ Sale      │  │           │  │ stock chk │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  medistock-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medicine, StockItem, Sale, Supplier, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`sale`] - Sale request validation and stock planning
//! - [`query`] - List filters, sorting and pagination
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use medistock_core::money::Money;
//!
//! let price = Money::from_cents(1250); // $12.50
//! let line_total = price.checked_multiply_quantity(3);
//! assert_eq!(line_total, Some(Money::from_cents(3750)));
//! ```

pub mod error;
pub mod money;
pub mod query;
pub mod sale;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use query::{Page, PageRequest, SortOrder};
pub use types::*;

/// Maximum number of lines in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity on a single sale line.
///
/// Catches typos like 10000 instead of 10 before they reach stock.
pub const MAX_LINE_QUANTITY: i64 = 10_000;

/// Maximum quantity accepted by a single receipt or adjustment.
pub const MAX_STOCK_DELTA: i64 = 1_000_000;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound on page size for list endpoints.
pub const MAX_PER_PAGE: u32 = 100;
