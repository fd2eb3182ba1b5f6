//! # MediStock API
//!
//! REST server for the pharmacy back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Layers                                      │
//! │                                                                         │
//! │  NormalizePathLayer (trailing slash)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CorsLayer ─► TraceLayer ─► Router<AppState>                            │
//! │                                  │                                      │
//! │  ┌───────────┬───────────┬───────┴───┬───────────┬──────────────────┐  │
//! │  │  health   │   auth    │ medicines │   stock   │ sales / reports  │  │
//! │  │           │ register  │ suppliers │ receipts  │                  │  │
//! │  │           │ login     │           │ adjust    │                  │  │
//! │  └───────────┴───────────┴───────────┴───────────┴──────────────────┘  │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                  medistock-db (repositories, stock locks)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Defaults, then `medistock.toml`, then environment variables:
//! - `MEDISTOCK_DATABASE_PATH` - SQLite file (default: medistock.db)
//! - `MEDISTOCK_PORT` - HTTP port (default: 8080)
//! - `MEDISTOCK_JWT_SECRET` - Secret for JWT signing
//! - `MEDISTOCK_JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `MEDISTOCK_JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)
//! - `MEDISTOCK_SALE_MAX_ATTEMPTS` - Conflict retries for stock writes (default: 3)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the complete HTTP application.
///
/// The path normaliser wraps the router so `/api/sales/` and `/api/sales`
/// reach the same handler.
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    let router = routes::api_router()
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

async fn not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "No such route")
}
