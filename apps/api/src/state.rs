//! Shared application state.

use std::sync::Arc;

use medistock_db::{Database, DbResult};

use crate::auth::JwtManager;
use crate::config::AppConfig;

/// Built once at startup and handed to every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let jwt = JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );
        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }

    /// Opens the database described by `config` (running migrations) and
    /// builds the state around it.
    pub async fn connect(config: AppConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(AppState::new(db, config))
    }
}
