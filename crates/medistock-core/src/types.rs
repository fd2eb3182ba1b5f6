//! # Domain Types
//!
//! Core domain types used throughout MediStock.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐  1—1  ┌─────────────────┐  1—N  ┌──────────────┐  │
//! │  │    Medicine     │──────►│    StockItem    │──────►│StockMovement │  │
//! │  │  id, code       │       │  quantity ≥ 0   │       │ receipt/adj/ │  │
//! │  │  unit_price     │       │  reorder level  │       │ sale ledger  │  │
//! │  └────────┬────────┘       └─────────────────┘       └──────┬───────┘  │
//! │           │ 1—N                                             │ N—1      │
//! │  ┌────────▼────────┐  N—1  ┌─────────────────┐       ┌──────▼───────┐  │
//! │  │    SaleLine     │──────►│      Sale       │       │   Supplier   │  │
//! │  │ price snapshot  │       │ immutable       │       │              │  │
//! │  └─────────────────┘       └────────┬────────┘       └──────────────┘  │
//! │                                     │ N—1                               │
//! │                            ┌────────▼────────┐                          │
//! │                            │      User       │                          │
//! │                            │ role, pw hash   │                          │
//! │                            └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for relations. Medicines also carry a
//! human-facing `code`, sales a `sale_number`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    Pharmacist,
    Cashier,
}

impl Role {
    /// Whether this role may edit the catalog, suppliers and stock.
    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, Role::Admin | Role::Pharmacist)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pharmacist => "pharmacist",
            Role::Cashier => "cashier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            "cashier" => Ok(Role::Cashier),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "admin".to_string(),
                    "pharmacist".to_string(),
                    "cashier".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Medicine
// =============================================================================

/// A catalog entry for a drug product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Medicine {
    pub id: String,
    /// Business code, unique across active and inactive medicines.
    pub code: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Current list price in cents.
    pub unit_price_cents: i64,
    /// False once soft-deleted.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Stock
// =============================================================================

/// On-hand quantity record for a medicine, joined with its catalog identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockItem {
    pub medicine_id: String,
    pub medicine_code: String,
    pub medicine_name: String,
    /// Never negative.
    pub quantity: i64,
    pub reorder_threshold: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// What caused a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MovementKind {
    /// Goods received from a supplier.
    Receipt,
    /// Manual correction (count, damage, expiry).
    Adjustment,
    /// Decrement recorded by a sale.
    Sale,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Receipt => "receipt",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Sale => "sale",
        }
    }
}

/// Append-only ledger entry for a stock change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub medicine_id: String,
    pub kind: MovementKind,
    /// Signed change applied to the quantity.
    pub delta: i64,
    /// Quantity right after this movement.
    pub quantity_after: i64,
    pub supplier_id: Option<String>,
    pub sale_id: Option<String>,
    /// Receipt reference or adjustment reason.
    pub note: Option<String>,
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number, `S-YYYYMMDD-XXXXXXXX`.
    pub sale_number: String,
    pub cashier_id: String,
    /// Sum of line totals.
    pub total_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses the snapshot pattern: code, name and price are frozen at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    /// 1-based position in the original request.
    pub line_no: i64,
    pub medicine_id: String,
    pub code_snapshot: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A sale together with its lines, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// User
// =============================================================================

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated caller, stamped on sales as the cashier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Commands (inputs)
// =============================================================================

/// Input for creating a medicine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMedicine {
    pub code: String,
    pub name: String,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Initial reorder threshold for the stock row. Defaults to 0.
    #[serde(default)]
    pub reorder_threshold: Option<i64>,
}

/// Partial medicine update. Absent fields are left unchanged; an empty
/// string clears an optional text field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicineUpdate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial supplier update, same conventions as [`MedicineUpdate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Goods received for one medicine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceipt {
    pub quantity: i64,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Signed correction of a medicine's stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub delta: i64,
    pub reason: String,
}

/// One requested sale line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub medicine_id: String,
    pub quantity: i64,
}

/// A sale request: ordered lines plus optional notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub lines: Vec<SaleLineRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Reports
// =============================================================================

/// Totals for sales within a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
    pub sale_count: i64,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// A medicine ranked by units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopSeller {
    pub medicine_id: String,
    pub code: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Sales aggregated per calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySales {
    /// `YYYY-MM-DD`
    pub day: String,
    pub sale_count: i64,
    pub revenue_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage_inventory());
        assert!(Role::Pharmacist.can_manage_inventory());
        assert!(!Role::Cashier.can_manage_inventory());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("pharmacist".parse::<Role>().unwrap(), Role::Pharmacist);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Cashier.to_string(), "cashier");
    }

    #[test]
    fn test_sale_request_deserializes_without_notes() {
        let req: SaleRequest =
            serde_json::from_str(r#"{"lines":[{"medicine_id":"abc","quantity":2}]}"#).unwrap();
        assert_eq!(req.lines.len(), 1);
        assert!(req.notes.is_none());
    }

    #[test]
    fn test_sale_detail_flattens_sale() {
        let detail = SaleDetail {
            sale: Sale {
                id: "s1".to_string(),
                sale_number: "S-20260101-ABCDEF01".to_string(),
                cashier_id: "u1".to_string(),
                total_cents: 1000,
                notes: None,
                created_at: Utc::now(),
            },
            lines: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["total_cents"], 1000);
        assert!(json["lines"].as_array().unwrap().is_empty());
    }
}
