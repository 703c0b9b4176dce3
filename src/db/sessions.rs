use crate::db::SqlitePool;
use crate::db::models::{SessionRecord, UserId};
use crate::error::AppError;

/// Server-side half of a login session. Timestamps are unix seconds.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        token: &str,
        user_id: UserId,
        username: &str,
        now: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, username, last_seen) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(username)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Renew `last_seen` if the session was last touched at or after `cutoff`.
    /// Returns `None` for unknown or idle-expired tokens.
    pub async fn touch(
        &self,
        token: &str,
        now: i64,
        cutoff: i64,
    ) -> Result<Option<SessionRecord>, AppError> {
        let rec = sqlx::query_as::<_, SessionRecord>(
            r#"UPDATE sessions SET last_seen = ?
               WHERE token = ? AND last_seen >= ?
               RETURNING token, user_id, username, last_seen"#,
        )
        .bind(now)
        .bind(token)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, token: &str) -> Result<Option<SessionRecord>, AppError> {
        let rec = sqlx::query_as::<_, SessionRecord>(
            "SELECT token, user_id, username, last_seen FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    pub async fn delete(&self, token: &str) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Drop every session idle since before `cutoff`.
    pub async fn purge_expired(&self, cutoff: i64) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM sessions WHERE last_seen < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
