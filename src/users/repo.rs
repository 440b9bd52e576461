use axum::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists")]
    Duplicate,
    #[error("user not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Persistence port for [`User`] records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::Duplicate`] when the
    /// username is already taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Exact-match lookup that skips soft-deleted rows.
    async fn find_by_username(&self, username: &str) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at, updated_at, deleted_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    debug!(username = %username, "unique violation on users.username");
                    return StoreError::Duplicate;
                }
            }
            StoreError::Storage(e)
        })?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at, deleted_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
pub use memory::MemoryUserStore;
