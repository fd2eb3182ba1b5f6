//! Sale endpoints.
//!
//! `POST /api/sales` runs the whole sale transaction: it either records
//! every line and decrements every stock row, or changes nothing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use medistock_core::query::SaleFilter;
use medistock_core::{Page, Sale, SaleDetail, SaleRequest};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/:id", get(get_sale))
}

/// Any authenticated role may sell; the caller is stamped as the cashier.
async fn create_sale(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<SaleRequest>,
) -> Result<(StatusCode, Json<SaleDetail>), ApiError> {
    debug!(cashier_id = %user.id(), lines = body.lines.len(), "Sale requested");
    let detail = state.db.sales().create_sale(user.id(), &body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn list_sales(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<SaleFilter>,
) -> Result<Json<Page<Sale>>, ApiError> {
    Ok(Json(state.db.sales().list(&filter).await?))
}

async fn get_sale(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SaleDetail>, ApiError> {
    Ok(Json(state.db.sales().get(&id).await?))
}
