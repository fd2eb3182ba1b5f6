//! Read-only report endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use medistock_core::{DailySales, SalesSummary, StockItem, TopSeller};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Window used when `from` is omitted.
const DEFAULT_WINDOW_DAYS: i64 = 30;

const DEFAULT_TOP_SELLING_LIMIT: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/sales-summary", get(sales_summary))
        .route("/reports/low-stock", get(low_stock))
        .route("/reports/top-selling", get(top_selling))
        .route("/reports/daily-sales", get(daily_sales))
}

/// `from` inclusive, `to` exclusive (RFC 3339). `to` defaults to now and
/// `from` to 30 days before `to`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl RangeParams {
    fn resolve(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let to = self.to.unwrap_or_else(Utc::now);
        let from = self
            .from
            .unwrap_or_else(|| to - Duration::days(DEFAULT_WINDOW_DAYS));
        (from, to)
    }
}

async fn sales_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<SalesSummary>, ApiError> {
    let (from, to) = params.resolve();
    Ok(Json(state.db.reports().sales_summary(from, to).await?))
}

async fn low_stock(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<StockItem>>, ApiError> {
    Ok(Json(state.db.reports().low_stock().await?))
}

async fn top_selling(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<Vec<TopSeller>>, ApiError> {
    let (from, to) = params.resolve();
    let limit = params.limit.unwrap_or(DEFAULT_TOP_SELLING_LIMIT);
    Ok(Json(state.db.reports().top_selling(from, to, limit).await?))
}

async fn daily_sales(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> Result<Json<Vec<DailySales>>, ApiError> {
    let (from, to) = params.resolve();
    Ok(Json(state.db.reports().daily_sales(from, to).await?))
}
