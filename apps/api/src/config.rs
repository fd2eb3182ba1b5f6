//! API configuration module.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDISTOCK_PORT=9000                                                │
//! │     MEDISTOCK_JWT_SECRET=...                                           │
//! │                                                                         │
//! │  2. TOML Config File (optional)                                        │
//! │     ./medistock.toml                                                   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # medistock.toml
//! host = "127.0.0.1"
//! port = 8080
//! database_path = "./data/medistock.db"
//! jwt_secret = "..."
//! sale_max_attempts = 3
//! lock_timeout_ms = 2000
//! ```

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use medistock_db::{DbConfig, RetryPolicy};

/// Secret used when nothing else is configured.
const DEV_JWT_SECRET: &str = "medistock-dev-secret-change-in-production";

/// Upper bound for `sale_max_attempts`.
const MAX_SALE_ATTEMPTS: u32 = 10;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds
    pub jwt_refresh_lifetime_secs: i64,

    /// Attempts for a stock transaction that keeps hitting conflicts
    pub sale_max_attempts: u32,

    /// Wait for a single per-medicine lock before counting a conflict
    pub lock_timeout_ms: u64,

    /// First retry delay; doubles per attempt
    pub retry_base_delay_ms: u64,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: "medistock.db".to_string(),
            max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_access_lifetime_secs: 3600,      // 1 hour
            jwt_refresh_lifetime_secs: 604_800, // 7 days
            sale_max_attempts: 3,
            lock_timeout_ms: 2000,
            retry_base_delay_ms: 50,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `medistock.toml` if present, then `MEDISTOCK_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("medistock").required(false))
            .add_source(Environment::with_prefix("MEDISTOCK").try_parsing(true))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// True while the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_access_lifetime_secs".to_string()));
        }
        if self.jwt_refresh_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_refresh_lifetime_secs".to_string()));
        }
        if !(1..=MAX_SALE_ATTEMPTS).contains(&self.sale_max_attempts) {
            return Err(ConfigError::InvalidValue("sale_max_attempts".to_string()));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("lock_timeout_ms".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .max_attempts(self.sale_max_attempts)
            .lock_timeout(Duration::from_millis(self.lock_timeout_ms))
            .base_delay(Duration::from_millis(self.retry_base_delay_ms))
    }

    pub fn db_config(&self) -> DbConfig {
        let base = if self.database_path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        };
        base.retry(self.retry_policy())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.uses_dev_secret());

        let retry = config.retry_policy();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.lock_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let empty_secret = AppConfig {
            jwt_secret: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            empty_secret.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        let too_many = AppConfig {
            sale_max_attempts: 11,
            ..Default::default()
        };
        assert!(matches!(too_many.validate(), Err(ConfigError::InvalidValue(_))));

        let zero = AppConfig {
            sale_max_attempts: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let negative = AppConfig {
            jwt_access_lifetime_secs: -1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_memory_database_config() {
        let config = AppConfig {
            database_path: ":memory:".to_string(),
            sale_max_attempts: 5,
            ..Default::default()
        };
        let db = config.db_config();
        assert_eq!(db.max_connections, 1);
        assert_eq!(db.retry.max_attempts, 5);
    }
}
