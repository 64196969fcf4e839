use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use pinpics_types::{Author, FullPost, PostImage, PostSummary};

use super::comment_repository::comments_for_post;
use super::like_repository::likes_for_post;
use crate::db::{timestamp_column, DbPool};

/// An uploaded image to attach to a new post
#[derive(Debug, Clone)]
pub struct NewPostImage {
    /// Public URL of the image
    pub picpath: String,
    /// Object storage key, absent for externally hosted images
    pub storage_key: Option<String>,
}

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a post with its images, returning the new post id
    pub fn create(
        &self,
        author_id: i64,
        name: &str,
        description: &str,
        images: &[NewPostImage],
    ) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO posts (author_id, name, description, created_at) VALUES (?, ?, ?, ?)",
            (author_id, name, description, Utc::now().to_rfc3339()),
        )
        .context("Failed to create post")?;
        let post_id = tx.last_insert_rowid();

        for (position, image) in images.iter().enumerate() {
            tx.execute(
                "INSERT INTO post_images (post_id, picpath, storage_key, position) VALUES (?, ?, ?, ?)",
                (post_id, &image.picpath, image.storage_key.as_deref(), position as i32),
            )
            .context("Failed to attach post image")?;
        }

        tx.commit()?;
        Ok(post_id)
    }

    /// Newest posts first
    pub fn list(&self, limit: i64) -> Result<Vec<PostSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.description, u.id, u.name, u.avatar,
                    (SELECT picpath FROM post_images WHERE post_id = p.id ORDER BY position LIMIT 1) AS cover,
                    p.created_at,
                    (SELECT COUNT(*) FROM likes WHERE post_id = p.id) AS like_count,
                    (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count
             FROM posts p
             JOIN users u ON p.author_id = u.id
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT ?",
        )?;

        let posts = stmt
            .query_map([limit], |row| {
                Ok(PostSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    author: Author {
                        id: row.get(3)?,
                        name: row.get(4)?,
                        avatar: row.get(5)?,
                    },
                    cover: row.get(6)?,
                    created_at: timestamp_column(row, 7)?,
                    like_count: row.get(8)?,
                    comment_count: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Load a post with images, comments and likes
    pub fn get_full(&self, post_id: i64) -> Result<Option<FullPost>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT p.id, p.name, p.description, u.id, u.name, u.avatar, p.created_at
                 FROM posts p
                 JOIN users u ON p.author_id = u.id
                 WHERE p.id = ?",
                [post_id],
                |row| {
                    Ok(FullPost {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        author: Author {
                            id: row.get(3)?,
                            name: row.get(4)?,
                            avatar: row.get(5)?,
                        },
                        images: Vec::new(),
                        created_at: timestamp_column(row, 6)?,
                        like_count: 0,
                        comments: Vec::new(),
                        likes: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut post) = post else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, picpath, position FROM post_images WHERE post_id = ? ORDER BY position",
        )?;
        post.images = stmt
            .query_map([post_id], |row| {
                Ok(PostImage {
                    id: row.get(0)?,
                    picpath: row.get(1)?,
                    position: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        post.likes = likes_for_post(&conn, post_id)?;
        post.like_count = post.likes.len() as i64;
        post.comments = comments_for_post(&conn, post_id)?;

        Ok(Some(post))
    }

    pub fn exists(&self, post_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Object storage keys of the post's uploaded images
    pub fn storage_keys(&self, post_id: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT storage_key FROM post_images
             WHERE post_id = ? AND storage_key IS NOT NULL
             ORDER BY position",
        )?;
        let keys = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Delete a post; images, likes and comments go with it
    ///
    /// Returns false when no such post existed.
    pub fn delete(&self, post_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute("DELETE FROM posts WHERE id = ?", [post_id])
            .context("Failed to delete post")?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CommentRepository, LikeRepository, NewUser, UserRepository};
    use crate::db::Database;

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let user = UserRepository::new(db.pool.clone())
            .create(&NewUser {
                name: "mira".to_string(),
                email: "mira@example.com".to_string(),
                password_hash: "hash".to_string(),
                avatar: "a".to_string(),
                background: "b".to_string(),
            })
            .unwrap();
        (db, user.id)
    }

    fn images() -> Vec<NewPostImage> {
        vec![
            NewPostImage {
                picpath: "http://localhost/files/one.png".to_string(),
                storage_key: Some("one.png".to_string()),
            },
            NewPostImage {
                picpath: "https://cdn.example.com/two.png".to_string(),
                storage_key: None,
            },
        ]
    }

    #[test]
    fn test_create_and_get_full() {
        let (db, user_id) = setup();
        let repo = PostRepository::new(db.pool.clone());
        let post_id = repo.create(user_id, "Sunset", "over the bay", &images()).unwrap();

        LikeRepository::new(db.pool.clone()).toggle(user_id, post_id).unwrap();
        CommentRepository::new(db.pool.clone())
            .create(post_id, user_id, "nice")
            .unwrap();

        let post = repo.get_full(post_id).unwrap().expect("post should exist");
        assert_eq!(post.name, "Sunset");
        assert_eq!(post.author.name, "mira");
        assert_eq!(post.images.len(), 2);
        assert_eq!(post.images[0].position, 0);
        assert_eq!(post.images[1].picpath, "https://cdn.example.com/two.png");
        assert_eq!(post.like_count, 1);
        assert!(post.is_liked_by(user_id));
        assert_eq!(post.comments.len(), 1);
    }

    #[test]
    fn test_get_full_missing_post() {
        let (db, _) = setup();
        let repo = PostRepository::new(db.pool.clone());
        assert!(repo.get_full(12345).unwrap().is_none());
        assert!(!repo.exists(12345).unwrap());
    }

    #[test]
    fn test_list_newest_first_with_counts() {
        let (db, user_id) = setup();
        let repo = PostRepository::new(db.pool.clone());
        let first = repo.create(user_id, "First", "", &images()).unwrap();
        let second = repo.create(user_id, "Second", "", &[]).unwrap();
        CommentRepository::new(db.pool.clone())
            .create(first, user_id, "hello")
            .unwrap();

        let posts = repo.list(10).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, second);
        assert_eq!(posts[0].cover, None);
        assert_eq!(posts[1].cover.as_deref(), Some("http://localhost/files/one.png"));
        assert_eq!(posts[1].comment_count, 1);
    }

    #[test]
    fn test_delete_cascades_and_reports_keys() {
        let (db, user_id) = setup();
        let repo = PostRepository::new(db.pool.clone());
        let post_id = repo.create(user_id, "Sunset", "", &images()).unwrap();
        LikeRepository::new(db.pool.clone()).toggle(user_id, post_id).unwrap();

        assert_eq!(repo.storage_keys(post_id).unwrap(), vec!["one.png".to_string()]);
        assert!(repo.delete(post_id).unwrap());
        assert!(!repo.delete(post_id).unwrap());

        let conn = db.connection().unwrap();
        let leftover: i64 = conn
            .query_row("SELECT COUNT(*) FROM likes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(leftover, 0);
    }
}
