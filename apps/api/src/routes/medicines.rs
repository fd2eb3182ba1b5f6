//! Medicine catalog endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use medistock_core::query::MedicineFilter;
use medistock_core::{Medicine, MedicineUpdate, NewMedicine, Page};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route(
            "/medicines/:id",
            get(get_medicine).patch(update_medicine).delete(delete_medicine),
        )
}

async fn list_medicines(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<MedicineFilter>,
) -> Result<Json<Page<Medicine>>, ApiError> {
    debug!(?filter, "Listing medicines");
    Ok(Json(state.db.medicines().list(&filter).await?))
}

async fn create_medicine(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<NewMedicine>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    user.require_inventory_role()?;
    let medicine = state.db.medicines().create(&body).await?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

async fn get_medicine(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Medicine>, ApiError> {
    Ok(Json(state.db.medicines().get(&id).await?))
}

async fn update_medicine(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MedicineUpdate>,
) -> Result<Json<Medicine>, ApiError> {
    user.require_inventory_role()?;
    Ok(Json(state.db.medicines().update(&id, &body).await?))
}

/// Soft delete: past sales keep their reference.
async fn delete_medicine(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    user.require_inventory_role()?;
    state.db.medicines().soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
