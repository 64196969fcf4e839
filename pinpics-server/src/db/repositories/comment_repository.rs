use anyhow::{Context, Result};
use chrono::Utc;

use pinpics_types::{Author, Comment};

use crate::db::{timestamp_column, DbPool};

pub(super) const COMMENT_SELECT: &str =
    "SELECT c.id, c.post_id, c.user_id, u.name, u.avatar, c.comment, c.picpath, c.created_at
     FROM comments c
     JOIN users u ON c.user_id = u.id";

pub(super) fn map_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let user_id: i64 = row.get(2)?;
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id,
        author: Author {
            id: user_id,
            name: row.get(3)?,
            avatar: row.get(4)?,
        },
        comment: row.get(5)?,
        picpath: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
    })
}

pub(super) fn comments_for_post(conn: &rusqlite::Connection, post_id: i64) -> Result<Vec<Comment>> {
    let query = format!("{} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC", COMMENT_SELECT);
    let mut stmt = conn.prepare(&query)?;
    let comments = stmt
        .query_map([post_id], map_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a comment and return it with author details attached
    pub fn create(&self, post_id: i64, user_id: i64, text: &str) -> Result<Comment> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (post_id, user_id, comment, picpath, created_at) VALUES (?, ?, ?, NULL, ?)",
            (post_id, user_id, text, Utc::now().to_rfc3339()),
        )
        .context("Failed to create comment")?;

        let id = conn.last_insert_rowid();
        let query = format!("{} WHERE c.id = ?", COMMENT_SELECT);
        let comment = conn.query_row(&query, [id], map_comment)?;
        Ok(comment)
    }

    /// Comments on a post, oldest first
    pub fn for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let conn = self.pool.get()?;
        comments_for_post(&conn, post_id)
    }
}
