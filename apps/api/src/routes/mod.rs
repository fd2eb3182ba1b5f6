//! HTTP route handlers.
//!
//! Every module exposes a `router()` mounted under `/api`. Paths are
//! declared without a trailing slash; `NormalizePathLayer` strips one from
//! incoming requests before routing.

use axum::Router;
use serde::Deserialize;

use medistock_core::PageRequest;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod medicines;
pub mod reports;
pub mod sales;
pub mod stock;
pub mod suppliers;

/// All `/api` routes.
pub fn api_router() -> Router<AppState> {
    let api = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(medicines::router())
        .merge(suppliers::router())
        .merge(stock::router())
        .merge(sales::router())
        .merge(reports::router());

    Router::new().nest("/api", api)
}

/// `?page=&per_page=` for endpoints without other filters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        PageRequest::new(params.page, params.per_page)
    }
}
