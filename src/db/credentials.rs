use crate::db::SqlitePool;
use crate::db::models::{User, UserId};
use crate::error::AppError;

/// User accounts: username plus Argon2 PHC hash.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Exact-match lookup, used both for the duplicate check and for login.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a new account. A concurrent registration that slipped past
    /// `find_by_username` surfaces as `DuplicateUsername` via the UNIQUE constraint.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, AppError> {
        let res = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_user_insert)?;
        Ok(res.last_insert_rowid())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
