use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use pinpics_types::{User, UserSettings};

use crate::db::{timestamp_column, DbPool};

const USER_COLUMNS: &str =
    "id, name, email, avatar, background, banana_level, bg_color, created_at, password_hash";

/// A user row together with its password hash (never leaves the server)
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// Fields required to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub background: String,
}

pub struct UserRepository {
    pool: DbPool,
}

fn map_user_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        user: User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            avatar: row.get(3)?,
            background: row.get(4)?,
            banana_level: row.get(5)?,
            settings: UserSettings {
                bg_color: row.get(6)?,
            },
            created_at: timestamp_column(row, 7)?,
        },
        password_hash: row.get(8)?,
    })
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return it with its assigned id
    pub fn create(&self, new_user: &NewUser) -> Result<User> {
        let conn = self.pool.get()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO users (name, email, password_hash, avatar, background, banana_level, created_at)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
            (
                &new_user.name,
                &new_user.email,
                &new_user.password_hash,
                &new_user.avatar,
                &new_user.background,
                created_at.to_rfc3339(),
            ),
        )
        .context("Failed to create user")?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            avatar: new_user.avatar.clone(),
            background: new_user.background.clone(),
            banana_level: 0,
            settings: UserSettings::default(),
            created_at,
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let record = conn
            .query_row(&query, [user_id], map_user_record)
            .optional()?;
        Ok(record.map(|r| r.user))
    }

    /// Look up credentials by account name or email (email match is case-insensitive)
    pub fn find_credentials(&self, login: &str) -> Result<Option<UserRecord>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {} FROM users WHERE name = ?1 OR lower(email) = lower(?1) LIMIT 1",
            USER_COLUMNS
        );
        let record = conn.query_row(&query, [login], map_user_record).optional()?;
        Ok(record)
    }

    /// Get user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {} FROM users WHERE lower(email) = lower(?)", USER_COLUMNS);
        let record = conn.query_row(&query, [email], map_user_record).optional()?;
        Ok(record.map(|r| r.user))
    }

    pub fn email_taken(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email)?.is_some())
    }

    pub fn name_taken(&self, name: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE name = ?",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace the user's display settings
    pub fn update_settings(&self, user_id: i64, settings: &UserSettings) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET bg_color = ? WHERE id = ?",
            (settings.bg_color.as_deref(), user_id),
        )
        .context("Failed to update user settings")?;
        Ok(())
    }

    pub fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            (password_hash, user_id),
        )
        .context("Failed to update password")?;
        Ok(())
    }

    /// Change a user's permission tier
    pub fn set_banana_level(&self, user_id: i64, level: i32) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET banana_level = ? WHERE id = ?",
            (level, user_id),
        )
        .context("Failed to update banana level")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn repo() -> UserRepository {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        UserRepository::new(db.pool)
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            avatar: "avatar".to_string(),
            background: "background".to_string(),
        }
    }

    #[test]
    fn test_create_and_get_by_id() {
        let repo = repo();
        let created = repo.create(&new_user("mira", "mira@example.com")).unwrap();

        let fetched = repo.get_by_id(created.id).unwrap().expect("user should exist");
        assert_eq!(fetched.name, "mira");
        assert_eq!(fetched.email, "mira@example.com");
        assert_eq!(fetched.banana_level, 0);
        assert!(repo.get_by_id(created.id + 100).unwrap().is_none());
    }

    #[test]
    fn test_find_credentials_by_name_or_email() {
        let repo = repo();
        repo.create(&new_user("mira", "Mira@Example.com")).unwrap();

        let by_name = repo.find_credentials("mira").unwrap().unwrap();
        let by_email = repo.find_credentials("mira@example.com").unwrap().unwrap();
        assert_eq!(by_name.user.id, by_email.user.id);
        assert_eq!(by_name.password_hash, "hash");
        assert!(repo.find_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = repo();
        repo.create(&new_user("mira", "mira@example.com")).unwrap();

        assert!(repo.email_taken("MIRA@example.com").unwrap());
        assert!(repo.name_taken("mira").unwrap());
        assert!(repo.create(&new_user("other", "mira@example.com")).is_err());
    }

    #[test]
    fn test_update_settings_and_level() {
        let repo = repo();
        let user = repo.create(&new_user("mira", "mira@example.com")).unwrap();

        repo.update_settings(
            user.id,
            &UserSettings {
                bg_color: Some("10,20,30,0.5".to_string()),
            },
        )
        .unwrap();
        repo.set_banana_level(user.id, 2).unwrap();

        let fetched = repo.get_by_id(user.id).unwrap().unwrap();
        assert_eq!(fetched.settings.bg_color.as_deref(), Some("10,20,30,0.5"));
        assert!(fetched.can_delete_posts());
    }
}
