//! Stock levels, receipts, adjustments and the movement ledger.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use medistock_core::query::StockFilter;
use medistock_core::{Page, StockAdjustment, StockItem, StockMovement, StockReceipt};

use super::PageParams;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list_stock))
        .route("/stock/:medicine_id", get(get_stock).patch(update_stock))
        .route("/stock/:medicine_id/receipts", post(receive_stock))
        .route("/stock/:medicine_id/adjustments", post(adjust_stock))
        .route("/stock/:medicine_id/movements", get(list_movements))
}

/// Only non-quantity fields are writable here; quantities change through
/// receipts, adjustments and sales.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockUpdate {
    pub reorder_threshold: i64,
}

async fn list_stock(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<StockFilter>,
) -> Result<Json<Page<StockItem>>, ApiError> {
    Ok(Json(state.db.stock().list(&filter).await?))
}

async fn get_stock(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(medicine_id): Path<String>,
) -> Result<Json<StockItem>, ApiError> {
    Ok(Json(state.db.stock().get(&medicine_id).await?))
}

async fn update_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(medicine_id): Path<String>,
    ApiJson(body): ApiJson<StockUpdate>,
) -> Result<Json<StockItem>, ApiError> {
    user.require_inventory_role()?;
    let item = state
        .db
        .stock()
        .set_reorder_threshold(&medicine_id, body.reorder_threshold)
        .await?;
    Ok(Json(item))
}

async fn receive_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(medicine_id): Path<String>,
    ApiJson(body): ApiJson<StockReceipt>,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    user.require_inventory_role()?;
    let movement = state
        .db
        .stock()
        .receive(&medicine_id, &body, Some(user.id()))
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn adjust_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(medicine_id): Path<String>,
    ApiJson(body): ApiJson<StockAdjustment>,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    user.require_inventory_role()?;
    let movement = state
        .db
        .stock()
        .adjust(&medicine_id, &body, Some(user.id()))
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn list_movements(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(medicine_id): Path<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<StockMovement>>, ApiError> {
    let page = state
        .db
        .stock()
        .movements(&medicine_id, params.into())
        .await?;
    Ok(Json(page))
}
