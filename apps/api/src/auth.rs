//! JWT authentication module.
//!
//! Handles password hashing, token generation/validation and the
//! [`CurrentUser`] extractor.
//!
//! ## Request Flow
//! ```text
//! Authorization: Bearer <access token>
//!      │
//!      ▼
//! CurrentUser::from_request_parts
//!      │  validate signature, expiry, token_type == "access"
//!      ▼
//! users.get(claims.sub)  ── missing or inactive ──► 401 UNAUTHORIZED
//!      │
//!      ▼
//! handler(user: CurrentUser, ...)
//! ```

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medistock_core::{Role, User, UserIdentity};
use medistock_db::DbError;

use crate::error::ApiError;
use crate::state::AppState;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// Token pair returned by login, register and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    /// Issues an access and a refresh token for `user`.
    pub fn issue_pair(&self, user: &UserIdentity) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.generate(user, ACCESS, self.access_lifetime_secs)?,
            refresh_token: self.generate(user, REFRESH, self.refresh_lifetime_secs)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_lifetime_secs,
        })
    }

    fn generate(&self, user: &UserIdentity, token_type: &str, lifetime_secs: i64) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate {} token: {}", token_type, e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_kind(token, ACCESS)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_kind(token, REFRESH)
    }

    fn validate_kind(&self, token: &str, expected: &str) -> Result<Claims, ApiError> {
        let claims = self.validate_token(token)?;

        if claims.token_type != expected {
            return Err(ApiError::unauthorized(format!("Expected {} token", expected)));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password into a PHC string (argon2id, default params).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller, re-loaded from the database on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserIdentity);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Admins and pharmacists manage catalog, suppliers and stock.
    pub fn require_inventory_role(&self) -> Result<(), ApiError> {
        if self.0.role.can_manage_inventory() {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Role '{}' may not modify inventory",
                self.0.role
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = state.jwt.validate_access_token(token)?;
        let user = active_user(state, &claims.sub).await?;

        Ok(CurrentUser(user.identity()))
    }
}

/// Loads a user that must still exist and be active.
pub async fn active_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    match state.db.users().get(user_id).await {
        Ok(user) if user.is_active => Ok(user),
        Ok(_) | Err(DbError::NotFound { .. }) => {
            Err(ApiError::unauthorized("User no longer exists or is inactive"))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> UserIdentity {
        UserIdentity {
            id: "user-001".to_string(),
            username: "pharma".to_string(),
            role,
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);

        let pair = manager.issue_pair(&identity(Role::Pharmacist)).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);

        let claims = manager.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.username, "pharma");
        assert_eq!(claims.role, Role::Pharmacist);
        assert_eq!(claims.token_type, "access");

        let refresh = manager.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_type, "refresh");
        assert_ne!(refresh.jti, claims.jti);
    }

    #[test]
    fn test_wrong_token_type() {
        let manager = JwtManager::new("test-secret".to_string(), 3600, 86400);
        let pair = manager.issue_pair(&identity(Role::Cashier)).unwrap();

        assert!(manager.validate_refresh_token(&pair.access_token).is_err());
        assert!(manager.validate_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a".to_string(), 3600, 86400);
        let verifier = JwtManager::new("secret-b".to_string(), 3600, 86400);
        let pair = issuer.issue_pair(&identity(Role::Admin)).unwrap();

        assert!(verifier.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let manager = JwtManager::new("test-secret".to_string(), -120, -120);
        let pair = manager.issue_pair(&identity(Role::Admin)).unwrap();

        assert!(manager.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_inventory_roles() {
        assert!(CurrentUser(identity(Role::Admin)).require_inventory_role().is_ok());
        assert!(CurrentUser(identity(Role::Pharmacist)).require_inventory_role().is_ok());
        assert!(CurrentUser(identity(Role::Cashier)).require_inventory_role().is_err());
    }
}
