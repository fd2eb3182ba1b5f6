//! Registration, login, token refresh and the current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use medistock_core::validation::{validate_password, validate_username};
use medistock_core::{Role, UserIdentity};
use medistock_db::NewUserRecord;

use crate::auth::{active_user, hash_password, verify_password, CurrentUser, TokenPair};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Only honoured for an admin caller.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserIdentity,
    /// Present for self-registration; an admin creating an account gets none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Creates an account. The first account of an empty database becomes
/// admin; later self-registrations are cashiers. An admin may pass `role`.
async fn register(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate_username(&body.username)?;
    validate_password(&body.password)?;

    let password_hash = hash_password(&body.password)?;

    let response = match body.role {
        Some(role) => {
            match &caller {
                Some(admin) if admin.role() == Role::Admin => {}
                Some(_) => return Err(ApiError::forbidden("Only admins may assign a role")),
                None => return Err(ApiError::unauthorized("Assigning a role requires an admin token")),
            }

            let user = state
                .db
                .users()
                .create(&NewUserRecord {
                    username: body.username,
                    password_hash,
                    role,
                })
                .await?;

            RegisterResponse {
                user: user.identity(),
                tokens: None,
            }
        }
        None => {
            let user = state
                .db
                .users()
                .create_self_registered(&body.username, &password_hash)
                .await?;
            let identity = user.identity();
            let tokens = state.jwt.issue_pair(&identity)?;

            RegisterResponse {
                user: identity,
                tokens: Some(tokens),
            }
        }
    };

    info!(
        user_id = %response.user.id,
        role = %response.user.role,
        "User registered"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .db
        .users()
        .find_by_username(&body.username)
        .await?
        .filter(|user| user.is_active && verify_password(&body.password, &user.password_hash));

    let Some(user) = user else {
        warn!(username = %body.username.trim(), "Failed login attempt");
        return Err(ApiError::unauthorized("Invalid username or password"));
    };

    info!(user_id = %user.id, "User logged in");
    Ok(Json(state.jwt.issue_pair(&user.identity())?))
}

/// Exchanges a refresh token for a new pair. The role is re-read, so a
/// changed role takes effect here.
async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let claims = state.jwt.validate_refresh_token(&body.refresh_token)?;
    let user = active_user(&state, &claims.sub).await?;

    Ok(Json(state.jwt.issue_pair(&user.identity())?))
}

async fn me(user: CurrentUser) -> Json<UserIdentity> {
    Json(user.0)
}
