//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in MediStock                              │
//! │                                                                         │
//! │  POST /api/sales/                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │                                                                  │  │
//! │  │  ValidationError ───► 400 VALIDATION_ERROR                       │  │
//! │  │  DbError::NotFound ─► 404 NOT_FOUND                              │  │
//! │  │  InsufficientStock ─► 409 INSUFFICIENT_STOCK                     │  │
//! │  │  DbError::Conflict ─► 409 CONFLICT                               │  │
//! │  │  anything else ─────► 500 INTERNAL (details only in the log)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Body: { "code": "INSUFFICIENT_STOCK", "message": "..." }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use medistock_core::{CoreError, ValidationError};
use medistock_db::DbError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Medicine not found: 4f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed or a unique value is taken (400)
    ValidationError,

    /// Missing, invalid or expired credentials (401)
    Unauthorized,

    /// Authenticated but the role may not do this (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock on hand (409)
    InsufficientStock,

    /// Concurrent writers kept winning until retries ran out (409)
    Conflict,

    /// Data store or unexpected failure (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Logs `detail` and returns a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::Conflict(detail) => {
                tracing::warn!(detail = %detail, "Stock conflict surfaced to client");
                ApiError::new(
                    ErrorCode::Conflict,
                    "The stock changed concurrently; please retry",
                )
            }
            DbError::Core(core) => ApiError::from(core),
            DbError::ForeignKeyViolation { message } => ApiError::internal(message),
            DbError::ConnectionFailed(e)
            | DbError::MigrationFailed(e)
            | DbError::QueryFailed(e)
            | DbError::Internal(e) => ApiError::internal(e),
            DbError::PoolExhausted => ApiError::internal("connection pool exhausted"),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MedicineNotFound(id) => ApiError::not_found("Medicine", &id),
            CoreError::InsufficientStock {
                code,
                available,
                requested,
                ..
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    code, available, requested
                ),
            ),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DbError::not_found("Medicine", "x"), StatusCode::NOT_FOUND),
            (DbError::duplicate("code", "AMOX"), StatusCode::BAD_REQUEST),
            (DbError::Conflict("busy".into()), StatusCode::CONFLICT),
            (DbError::QueryFailed("syntax".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                DbError::Core(CoreError::InsufficientStock {
                    medicine_id: "m".into(),
                    code: "AMOX".into(),
                    available: 3,
                    requested: 7,
                }),
                StatusCode::CONFLICT,
            ),
        ];

        for (db_err, status) in cases {
            let api: ApiError = db_err.into();
            assert_eq!(api.code.status(), status, "{}", api);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let api: ApiError = DbError::QueryFailed("no such table: secrets".into()).into();
        assert_eq!(api.code, ErrorCode::Internal);
        assert!(!api.message.contains("secrets"));
    }

    #[test]
    fn test_codes_serialize_screaming() {
        let api = ApiError::new(ErrorCode::InsufficientStock, "short");
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert_eq!(json["message"], "short");
    }
}
