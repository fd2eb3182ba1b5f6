//! # User Repository
//!
//! Accounts for authentication. Password hashing happens in the API layer;
//! this repository only stores the PHC string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use medistock_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, is_active, created_at";

/// A user row ready to insert.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user with an explicit role.
    pub async fn create(&self, record: &NewUserRecord) -> DbResult<User> {
        self.insert(&record.username, &record.password_hash, Some(record.role))
            .await
    }

    /// Creates a self-registered user: `admin` if the table is empty,
    /// `cashier` otherwise.
    ///
    /// The role is decided inside the INSERT, so two simultaneous first
    /// registrations cannot both become admin.
    pub async fn create_self_registered(&self, username: &str, password_hash: &str) -> DbResult<User> {
        self.insert(username, password_hash, None).await
    }

    async fn insert(&self, username: &str, password_hash: &str, role: Option<Role>) -> DbResult<User> {
        let id = generate_id();
        let username = username.trim();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, is_active, created_at)
            SELECT ?1, ?2, ?3,
                   COALESCE(?4, CASE WHEN (SELECT COUNT(*) FROM users) = 0
                                     THEN 'admin' ELSE 'cashier' END),
                   1, ?5
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(username))?;

        let user = self.get(&id).await?;
        info!(id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Gets a user by ID (active or not).
    pub async fn get(&self, id: &str) -> DbResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
