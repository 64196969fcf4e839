use crate::db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Sessions live for thirty days
pub const SESSION_DAYS: i64 = 30;

/// Database-backed session manager for persistent authentication
///
/// Tokens are UUID v4 strings handed to clients as the `token` cookie
/// and accepted back either as that cookie or as `X-Session-Token`.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new session for a user and return its token
    pub fn create_session(&self, user_id: i64) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(SESSION_DAYS);

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id,
                created_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user {}", user_id);
        Ok(token)
    }

    /// Validate a session token and return the associated user ID
    ///
    /// Expired sessions are removed on sight.
    pub fn validate_session(&self, token: &str) -> Result<i64> {
        let conn = self.db.connection()?;

        let (user_id, expires_at_str): (i64, String) = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Session not found")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            anyhow::bail!("Session has expired");
        }

        Ok(user_id)
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE token = ?1",
                rusqlite::params![token],
            )
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(())
    }

    /// Drop every session a user holds, used after a password reset
    pub fn delete_user_sessions(&self, user_id: i64) -> Result<usize> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE user_id = ?1",
                rusqlite::params![user_id],
            )
            .context("Failed to delete user sessions")?;
        Ok(rows_affected)
    }

    /// Clean up expired sessions from the database
    ///
    /// Returns the number of sessions deleted.
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                rusqlite::params![now],
            )
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, i64) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");

        let conn = db.connection().expect("Failed to get connection");
        conn.execute(
            "INSERT INTO users (name, email, password_hash, avatar, background, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                "testuser",
                "test@example.com",
                "hash",
                "avatar",
                "background",
                Utc::now().to_rfc3339(),
            ],
        )
        .expect("Failed to create test user");
        let user_id = conn.last_insert_rowid();

        (db, user_id)
    }

    #[test]
    fn test_create_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).expect("Failed to create session");
        assert!(!token.is_empty());
        assert!(Uuid::parse_str(&token).is_ok(), "Token should be a valid UUID");
    }

    #[test]
    fn test_validate_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).expect("Failed to create session");
        let validated_user_id = manager.validate_session(&token).expect("Failed to validate session");

        assert_eq!(user_id, validated_user_id);
    }

    #[test]
    fn test_validate_invalid_session() {
        let (db, _) = setup_test_db();
        let manager = SessionManager::new(db);

        assert!(manager.validate_session("invalid-token").is_err());
    }

    #[test]
    fn test_delete_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).expect("Failed to create session");
        manager.delete_session(&token).expect("Failed to delete session");

        assert!(manager.validate_session(&token).is_err(), "Session should be invalid after deletion");
    }

    #[test]
    fn test_delete_user_sessions() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let first = manager.create_session(user_id).unwrap();
        let second = manager.create_session(user_id).unwrap();
        assert_eq!(manager.delete_user_sessions(user_id).unwrap(), 2);
        assert!(manager.validate_session(&first).is_err());
        assert!(manager.validate_session(&second).is_err());
    }

    #[test]
    fn test_cleanup_expired_sessions() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db.clone());

        let token = manager.create_session(user_id).expect("Failed to create session");

        // Manually expire the session
        let conn = db.connection().expect("Failed to get connection");
        let expired_time = (Utc::now() - Duration::days(1)).to_rfc3339();
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![expired_time, token],
        )
        .expect("Failed to expire session");

        let cleaned = manager.cleanup_expired_sessions().expect("Failed to cleanup");
        assert_eq!(cleaned, 1);
        assert!(manager.validate_session(&token).is_err());
    }

    #[test]
    fn test_session_token_uniqueness() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token1 = manager.create_session(user_id).expect("Failed to create session 1");
        let token2 = manager.create_session(user_id).expect("Failed to create session 2");
        let token3 = manager.create_session(user_id).expect("Failed to create session 3");

        assert_ne!(token1, token2);
        assert_ne!(token2, token3);
        assert_ne!(token1, token3);
    }
}
