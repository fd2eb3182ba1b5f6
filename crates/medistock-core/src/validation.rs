//! # Validation Module
//!
//! Field validation rules for MediStock inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Web UI            - immediate feedback                       │
//! │  Layer 2: axum extractors   - JSON shape / types                       │
//! │  Layer 3: THIS MODULE       - business field rules                     │
//! │  Layer 4: SQLite            - NOT NULL, UNIQUE, CHECK, FOREIGN KEY     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Optional text fields are normalised: surrounding whitespace is trimmed and
//! an empty value becomes `None`.

use crate::error::ValidationError;
use crate::types::{
    MedicineUpdate, NewMedicine, NewSupplier, StockAdjustment, StockReceipt, SupplierUpdate,
};
use crate::{MAX_LINE_QUANTITY, MAX_STOCK_DELTA};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CODE_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_NOTE_LEN: usize = 500;
const MAX_CONTACT_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 50;
const MAX_ADDRESS_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a medicine code.
///
/// ## Rules
/// - Not empty, at most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use medistock_core::validation::validate_code;
///
/// assert!(validate_code("AMOX-500").is_ok());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name (medicine or supplier).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN)
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Trims an optional text field, maps blank to `None` and checks its length.
pub fn normalize_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(Some(value.to_string()))
}

/// Validates a supplier e-mail address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a login name.
///
/// ## Rules
/// - 3 to 50 characters
/// - Letters, digits, `_`, `.` and `-`
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let len = username.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    if len < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }
    if len > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '_', '.' and '-'".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing (8..=128 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }
    if len > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity (1..=MAX_LINE_QUANTITY).
///
/// ## Example
/// ```rust
/// use medistock_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free samples).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price_cents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a reorder threshold (≥ 0).
pub fn validate_reorder_threshold(threshold: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_DELTA).contains(&threshold) {
        return Err(ValidationError::OutOfRange {
            field: "reorder_threshold".to_string(),
            min: 0,
            max: MAX_STOCK_DELTA,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string for the named field.
///
/// ## Example
/// ```rust
/// use medistock_core::validation::validate_uuid;
///
/// assert!(validate_uuid("medicine_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("medicine_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Command Validators
// =============================================================================

/// Validates and normalises a new medicine.
pub fn validate_new_medicine(input: &NewMedicine) -> ValidationResult<NewMedicine> {
    validate_code(&input.code)?;
    validate_name(&input.name)?;
    validate_price_cents(input.unit_price_cents)?;
    let reorder_threshold = input.reorder_threshold.unwrap_or(0);
    validate_reorder_threshold(reorder_threshold)?;

    Ok(NewMedicine {
        code: input.code.trim().to_string(),
        name: input.name.trim().to_string(),
        unit_price_cents: input.unit_price_cents,
        manufacturer: normalize_optional_text(
            "manufacturer",
            input.manufacturer.as_deref(),
            MAX_NAME_LEN,
        )?,
        category: normalize_optional_text("category", input.category.as_deref(), MAX_CATEGORY_LEN)?,
        description: normalize_optional_text(
            "description",
            input.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?,
        reorder_threshold: Some(reorder_threshold),
    })
}

/// Validates a partial medicine update. Present fields follow the same rules
/// as creation; blank optional text is kept as `Some("")` so the repository
/// can tell "clear" from "leave unchanged".
pub fn validate_medicine_update(input: &MedicineUpdate) -> ValidationResult<MedicineUpdate> {
    if let Some(code) = &input.code {
        validate_code(code)?;
    }
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(price) = input.unit_price_cents {
        validate_price_cents(price)?;
    }

    Ok(MedicineUpdate {
        code: input.code.as_deref().map(|c| c.trim().to_string()),
        name: input.name.as_deref().map(|n| n.trim().to_string()),
        unit_price_cents: input.unit_price_cents,
        manufacturer: clearable("manufacturer", &input.manufacturer, MAX_NAME_LEN)?,
        category: clearable("category", &input.category, MAX_CATEGORY_LEN)?,
        description: clearable("description", &input.description, MAX_DESCRIPTION_LEN)?,
    })
}

fn clearable(field: &str, value: &Option<String>, max: usize) -> ValidationResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => Ok(Some(
            normalize_optional_text(field, Some(v.as_str()), max)?.unwrap_or_default(),
        )),
    }
}

/// Validates and normalises a new supplier.
pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<NewSupplier> {
    validate_name(&input.name)?;
    let email = normalize_optional_text("email", input.email.as_deref(), MAX_CONTACT_LEN)?;
    if let Some(email) = &email {
        validate_email(email)?;
    }

    Ok(NewSupplier {
        name: input.name.trim().to_string(),
        contact_name: normalize_optional_text(
            "contact_name",
            input.contact_name.as_deref(),
            MAX_CONTACT_LEN,
        )?,
        email,
        phone: normalize_optional_text("phone", input.phone.as_deref(), MAX_PHONE_LEN)?,
        address: normalize_optional_text("address", input.address.as_deref(), MAX_ADDRESS_LEN)?,
    })
}

/// Validates a partial supplier update (see [`validate_medicine_update`]).
pub fn validate_supplier_update(input: &SupplierUpdate) -> ValidationResult<SupplierUpdate> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let email = clearable("email", &input.email, MAX_CONTACT_LEN)?;
    if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }

    Ok(SupplierUpdate {
        name: input.name.as_deref().map(|n| n.trim().to_string()),
        contact_name: clearable("contact_name", &input.contact_name, MAX_CONTACT_LEN)?,
        email,
        phone: clearable("phone", &input.phone, MAX_PHONE_LEN)?,
        address: clearable("address", &input.address, MAX_ADDRESS_LEN)?,
    })
}

/// Validates a stock receipt. Quantity must be in 1..=MAX_STOCK_DELTA.
pub fn validate_receipt(input: &StockReceipt) -> ValidationResult<StockReceipt> {
    if input.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if input.quantity > MAX_STOCK_DELTA {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_DELTA,
        });
    }

    let supplier_id = normalize_optional_text("supplier_id", input.supplier_id.as_deref(), 64)?;
    if let Some(id) = &supplier_id {
        validate_uuid("supplier_id", id)?;
    }

    Ok(StockReceipt {
        quantity: input.quantity,
        supplier_id,
        reference: normalize_optional_text("reference", input.reference.as_deref(), MAX_NOTE_LEN)?,
    })
}

/// Validates a stock adjustment: non-zero bounded delta and a reason.
pub fn validate_adjustment(input: &StockAdjustment) -> ValidationResult<StockAdjustment> {
    if input.delta == 0 || input.delta.abs() > MAX_STOCK_DELTA {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_STOCK_DELTA,
            max: MAX_STOCK_DELTA,
        });
    }
    validate_required_text("reason", &input.reason, MAX_NOTE_LEN)?;

    Ok(StockAdjustment {
        delta: input.delta,
        reason: input.reason.trim().to_string(),
    })
}

/// Validates optional sale notes.
pub fn normalize_sale_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    normalize_optional_text("notes", notes, MAX_NOTE_LEN)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("AMOX-500").is_ok());
        assert!(validate_code("para_1g").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_username_and_password() {
        assert!(validate_username("jane.doe").is_ok());
        assert!(validate_username("jo").is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_password("correct horse").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_new_medicine_normalises_optional_text() {
        let input = NewMedicine {
            code: " IBU-200 ".to_string(),
            name: "Ibuprofen 200mg".to_string(),
            unit_price_cents: 350,
            manufacturer: Some("   ".to_string()),
            category: Some(" Analgesic ".to_string()),
            description: None,
            reorder_threshold: None,
        };
        let clean = validate_new_medicine(&input).unwrap();
        assert_eq!(clean.code, "IBU-200");
        assert_eq!(clean.manufacturer, None);
        assert_eq!(clean.category.as_deref(), Some("Analgesic"));
        assert_eq!(clean.reorder_threshold, Some(0));
    }

    #[test]
    fn test_new_medicine_rejects_negative_price() {
        let input = NewMedicine {
            code: "IBU-200".to_string(),
            name: "Ibuprofen".to_string(),
            unit_price_cents: -5,
            ..Default::default()
        };
        assert!(validate_new_medicine(&input).is_err());
    }

    #[test]
    fn test_medicine_update_blank_means_clear() {
        let update = MedicineUpdate {
            manufacturer: Some("".to_string()),
            ..Default::default()
        };
        let clean = validate_medicine_update(&update).unwrap();
        assert_eq!(clean.manufacturer.as_deref(), Some(""));
        assert!(clean.category.is_none());
    }

    #[test]
    fn test_supplier_email() {
        let ok = NewSupplier {
            name: "Acme Pharma".to_string(),
            email: Some("orders@acme.example".to_string()),
            ..Default::default()
        };
        assert!(validate_new_supplier(&ok).is_ok());

        let bad = NewSupplier {
            name: "Acme Pharma".to_string(),
            email: Some("orders-at-acme".to_string()),
            ..Default::default()
        };
        assert!(validate_new_supplier(&bad).is_err());
    }

    #[test]
    fn test_receipt_and_adjustment_rules() {
        assert!(validate_receipt(&StockReceipt {
            quantity: 0,
            ..Default::default()
        })
        .is_err());
        assert!(validate_receipt(&StockReceipt {
            quantity: 5,
            supplier_id: Some("nope".to_string()),
            reference: None,
        })
        .is_err());

        assert!(validate_adjustment(&StockAdjustment {
            delta: 0,
            reason: "count".to_string(),
        })
        .is_err());
        assert!(validate_adjustment(&StockAdjustment {
            delta: -2,
            reason: "  ".to_string(),
        })
        .is_err());
        assert!(validate_adjustment(&StockAdjustment {
            delta: -2,
            reason: "expired".to_string(),
        })
        .is_ok());
    }
}
