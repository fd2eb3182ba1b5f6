//! # Error Types
//!
//! Domain-specific error types for medistock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  medistock-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  medistock-db errors                                                    │
//! │  └── DbError          - Database operation failures (wraps CoreError)   │
//! │                                                                         │
//! │  apps/api errors                                                        │
//! │  └── ApiError         - What the HTTP client sees ({code, message})     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Medicine does not exist or was soft-deleted.
    #[error("Medicine not found: {0}")]
    MedicineNotFound(String),

    /// Not enough stock on hand to satisfy a sale line or a negative adjustment.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale line: AMOX-500 × 7
    ///      │
    ///      ▼
    /// Locked re-read: available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { code: "AMOX-500", available: 3, requested: 7 }
    ///      │
    ///      ▼
    /// 409 INSUFFICIENT_STOCK, nothing persisted
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine_id: String,
        code: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any data is read or written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid code characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate medicine code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Sale request carries no lines.
    #[error("sale must contain at least one line")]
    EmptySale,
}

impl ValidationError {
    /// Prefixes the field name with a position, e.g. `lines[2].quantity`.
    pub fn at_line(self, index: usize) -> Self {
        let prefix = |field: String| format!("lines[{}].{}", index, field);
        match self {
            ValidationError::Required { field } => ValidationError::Required {
                field: prefix(field),
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: prefix(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => ValidationError::MustBePositive {
                field: prefix(field),
            },
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: prefix(field),
                reason,
            },
            other => other,
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
