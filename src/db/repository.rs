use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment, Post, SplitTimestamp};
use crate::store::PostStore;

use super::schema::SCHEMA;

const POST_COLUMNS: &str =
    "id, title, body, date_seconds, date_nanoseconds, image_url, author, tags";

/// Local SQLite post store.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Post operations

    pub async fn upsert_post(&self, post: Post) -> Result<()> {
        let tags_json = serde_json::to_string(&post.tags)?;
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO posts (id, title, body, date_seconds, date_nanoseconds, image_url, author, tags)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                       ON CONFLICT(id) DO UPDATE SET
                           title = excluded.title,
                           body = excluded.body,
                           date_seconds = excluded.date_seconds,
                           date_nanoseconds = excluded.date_nanoseconds,
                           image_url = excluded.image_url,
                           author = excluded.author,
                           tags = excluded.tags"#,
                    params![
                        post.id,
                        post.title,
                        post.body,
                        post.date.seconds,
                        post.date.nanoseconds,
                        post.image_url,
                        post.author,
                        tags_json,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for Repository {
    async fn fetch_single_post(&self, post_id: &str) -> Result<Post> {
        let id = post_id.to_string();
        let post = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM posts WHERE id = ?1",
                    POST_COLUMNS
                ))?;
                let post = stmt.query_row(params![id], post_from_row).optional()?;
                Ok(post)
            })
            .await?;

        post.ok_or_else(|| AppError::ArticleNotFound(post_id.to_string()))
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let posts = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM posts ORDER BY date_seconds DESC NULLS LAST, created_at DESC",
                    POST_COLUMNS
                ))?;
                let posts = stmt
                    .query_map([], post_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(posts)
            })
            .await?;
        Ok(posts)
    }

    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let id = post_id.to_string();
        let comments = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, post_id, comment, created_at FROM comments WHERE post_id = ?1 ORDER BY created_at, id",
                )?;
                let comments = stmt
                    .query_map(params![id], comment_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(comments)
            })
            .await?;
        Ok(comments)
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        let created = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO comments (post_id, comment) VALUES (?1, ?2)",
                    params![comment.post_id, comment.comment],
                )?;
                let id = conn.last_insert_rowid();
                let created = conn.query_row(
                    "SELECT id, post_id, comment, created_at FROM comments WHERE id = ?1",
                    params![id],
                    comment_from_row,
                )?;
                Ok(created)
            })
            .await?;
        Ok(created)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    let tags: String = row.get(7)?;
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        date: SplitTimestamp {
            seconds: row.get(3)?,
            nanoseconds: row.get(4)?,
        },
        image_url: row.get(5)?,
        author: row.get(6)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get::<_, i64>(0)?.to_string(),
        post_id: row.get(1)?,
        comment: row.get(2)?,
        created_at: row
            .get::<_, Option<String>>(3)?
            .and_then(|s| parse_datetime(&s)),
    })
}
