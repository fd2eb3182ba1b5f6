//! Supplier endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use medistock_core::query::SupplierFilter;
use medistock_core::{NewSupplier, Page, Supplier, SupplierUpdate};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).patch(update_supplier).delete(delete_supplier),
        )
}

async fn list_suppliers(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<SupplierFilter>,
) -> Result<Json<Page<Supplier>>, ApiError> {
    Ok(Json(state.db.suppliers().list(&filter).await?))
}

async fn create_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    user.require_inventory_role()?;
    let supplier = state.db.suppliers().create(&body).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn get_supplier(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Supplier>, ApiError> {
    Ok(Json(state.db.suppliers().get(&id).await?))
}

async fn update_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SupplierUpdate>,
) -> Result<Json<Supplier>, ApiError> {
    user.require_inventory_role()?;
    Ok(Json(state.db.suppliers().update(&id, &body).await?))
}

async fn delete_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_inventory_role()?;
    state.db.suppliers().soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
