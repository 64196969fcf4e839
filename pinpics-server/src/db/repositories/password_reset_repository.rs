use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;

/// Reset tokens stay valid for this many minutes
const RESET_TOKEN_MINUTES: i64 = 60;

pub struct PasswordResetRepository {
    pool: DbPool,
}

impl PasswordResetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Issue a reset token for a user
    pub fn create(&self, user_id: i64) -> Result<String> {
        let conn = self.pool.get()?;
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES);

        conn.execute(
            "INSERT INTO password_resets (token, user_id, expires_at) VALUES (?, ?, ?)",
            (&token, user_id, expires_at.to_rfc3339()),
        )
        .context("Failed to create password reset token")?;

        Ok(token)
    }

    /// Consume a token, returning its user when the token is known and unexpired
    ///
    /// Tokens are single use; a consumed or expired token is removed either way.
    pub fn consume(&self, token: &str) -> Result<Option<i64>> {
        let conn = self.pool.get()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM password_resets WHERE token = ?",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };

        conn.execute("DELETE FROM password_resets WHERE token = ?", [token])?;

        let expires_at: DateTime<Utc> = expires_at
            .parse()
            .context("Invalid expiry on password reset token")?;
        if expires_at < Utc::now() {
            return Ok(None);
        }

        Ok(Some(user_id))
    }
}
