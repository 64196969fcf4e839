use anyhow::{Context, Result};
use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::SCHEMA;
use crate::password::hash_password;

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = Self::create_connection_manager(path)?
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::new(manager).context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Create appropriate connection manager based on path
    ///
    /// `:memory:` maps to a uniquely named shared-cache database so every
    /// pooled connection sees the same tables.
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> Result<SqliteConnectionManager> {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            let uri = format!(
                "file:pinpics-{}?mode=memory&cache=shared",
                uuid::Uuid::new_v4().simple()
            );
            Ok(SqliteConnectionManager::file(uri))
        } else {
            Ok(SqliteConnectionManager::file(path))
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Seed an empty database with an administrator and a welcome post
    ///
    /// Does nothing once any user exists.
    pub fn seed_demo_data(&self, password_cost: u32) -> Result<()> {
        let conn = self.connection()?;
        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let password_hash = hash_password("banana123", password_cost)?;
        conn.execute(
            "INSERT INTO users (name, email, password_hash, avatar, background, banana_level, created_at)
             VALUES (?, ?, ?, ?, ?, 1, ?)",
            (
                "banana",
                "banana@pinpics.local",
                password_hash,
                crate::api::auth::generated_avatar("banana"),
                crate::api::auth::generated_avatar("banana"),
                &now,
            ),
        )
        .context("Failed to seed administrator")?;
        let admin_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO posts (author_id, name, description, created_at) VALUES (?, ?, ?, ?)",
            (
                admin_id,
                "Welcome to Pinpics",
                "Like this post, leave a comment, or pin your own pictures.",
                &now,
            ),
        )
        .context("Failed to seed welcome post")?;
        let post_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO post_images (post_id, picpath, storage_key, position) VALUES (?, ?, NULL, 0)",
            (
                post_id,
                "https://ui-avatars.com/api/?name=Pinpics&size=512&background=F5C518&color=000",
            ),
        )
        .context("Failed to seed welcome image")?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
