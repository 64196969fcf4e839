use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use pinpics_types::{Like, LikeStatus};

use crate::db::DbPool;

pub(super) fn likes_for_post(conn: &rusqlite::Connection, post_id: i64) -> Result<Vec<Like>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, post_id FROM likes WHERE post_id = ? ORDER BY created_at ASC",
    )?;
    let likes = stmt
        .query_map([post_id], |row| {
            Ok(Like {
                user_id: row.get(0)?,
                post_id: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(likes)
}

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Flip the user's like on a post and report the resulting state
    pub fn toggle(&self, user_id: i64, post_id: i64) -> Result<LikeStatus> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let existing = tx
            .query_row(
                "SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?",
                (user_id, post_id),
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        let liked = if existing.is_some() {
            tx.execute(
                "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
                (user_id, post_id),
            )
            .context("Failed to remove like")?;
            false
        } else {
            tx.execute(
                "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
                (user_id, post_id, Utc::now().to_rfc3339()),
            )
            .context("Failed to add like")?;
            true
        };

        let like_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(LikeStatus { liked, like_count })
    }

    pub fn for_post(&self, post_id: i64) -> Result<Vec<Like>> {
        let conn = self.pool.get()?;
        likes_for_post(&conn, post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{NewUser, PostRepository, UserRepository};
    use crate::db::Database;

    fn setup() -> (LikeRepository, i64, i64, i64) {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let users = UserRepository::new(db.pool.clone());
        let make = |name: &str| {
            users
                .create(&NewUser {
                    name: name.to_string(),
                    email: format!("{}@example.com", name),
                    password_hash: "hash".to_string(),
                    avatar: "a".to_string(),
                    background: "b".to_string(),
                })
                .unwrap()
        };
        let alice = make("alice");
        let bob = make("bob");
        let post_id = PostRepository::new(db.pool.clone())
            .create(alice.id, "Sunset", "", &[])
            .unwrap();
        (LikeRepository::new(db.pool.clone()), alice.id, bob.id, post_id)
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let (repo, alice, _, post_id) = setup();

        let first = repo.toggle(alice, post_id).unwrap();
        assert_eq!(first, LikeStatus { liked: true, like_count: 1 });

        let second = repo.toggle(alice, post_id).unwrap();
        assert_eq!(second, LikeStatus { liked: false, like_count: 0 });
        assert!(repo.for_post(post_id).unwrap().is_empty());
    }

    #[test]
    fn test_count_covers_all_users() {
        let (repo, alice, bob, post_id) = setup();

        repo.toggle(alice, post_id).unwrap();
        let status = repo.toggle(bob, post_id).unwrap();
        assert_eq!(status.like_count, 2);

        let likes = repo.for_post(post_id).unwrap();
        assert!(likes.contains(&Like { user_id: bob, post_id }));
    }

    #[test]
    fn test_toggle_missing_post_fails() {
        let (repo, alice, _, _) = setup();
        assert!(repo.toggle(alice, 9999).is_err());
    }
}
