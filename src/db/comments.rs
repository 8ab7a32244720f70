// Comment store - every lookup is scoped by (post_id, comment_id)
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::models::{Comment, COMMENT_COLUMNS};
use crate::db::{with_conn, RepositoryError};
use crate::state::DbPool;
use crate::validation::CommentContent;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepositoryError>;

    /// Matches only when the comment belongs to `post_id`
    async fn get(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>, RepositoryError>;

    /// Insert a comment dated now. `None` if the post does not exist.
    async fn create(
        &self,
        post_id: i64,
        content: &CommentContent,
    ) -> Result<Option<Comment>, RepositoryError>;

    async fn update(
        &self,
        post_id: i64,
        comment_id: i64,
        content: Option<&CommentContent>,
    ) -> Result<Option<Comment>, RepositoryError>;

    async fn delete(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, RepositoryError>;
}

/// SQLite implementation
pub struct SqliteCommentRepository {
    pool: DbPool,
}

impl SqliteCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepositoryError> {
        with_conn(&self.pool, move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY id",
                COMMENT_COLUMNS
            ))?;
            let rows = stmt.query_map(params![post_id], Comment::from_row)?;
            let comments = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(comments)
        })
        .await
    }

    async fn get(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>, RepositoryError> {
        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM comments WHERE id = ?1 AND post_id = ?2",
                    COMMENT_COLUMNS
                ),
                params![comment_id, post_id],
                Comment::from_row,
            )
            .optional()
        })
        .await
    }

    async fn create(
        &self,
        post_id: i64,
        content: &CommentContent,
    ) -> Result<Option<Comment>, RepositoryError> {
        let content = content.as_str().to_owned();
        let date = Utc::now().timestamp_millis();

        // Single statement: the insert happens only if the parent post exists
        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO comments (content, date, post_id)
                     SELECT ?1, ?2, id FROM posts WHERE id = ?3
                     RETURNING {}",
                    COMMENT_COLUMNS
                ),
                params![content, date, post_id],
                Comment::from_row,
            )
            .optional()
        })
        .await
    }

    async fn update(
        &self,
        post_id: i64,
        comment_id: i64,
        content: Option<&CommentContent>,
    ) -> Result<Option<Comment>, RepositoryError> {
        let Some(content) = content else {
            return self.get(post_id, comment_id).await;
        };
        let content = content.as_str().to_owned();

        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE comments SET content = ?1 WHERE id = ?2 AND post_id = ?3 RETURNING {}",
                    COMMENT_COLUMNS
                ),
                params![content, comment_id, post_id],
                Comment::from_row,
            )
            .optional()
        })
        .await
    }

    async fn delete(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, RepositoryError> {
        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "DELETE FROM comments WHERE id = ?1 AND post_id = ?2 RETURNING {}",
                    COMMENT_COLUMNS
                ),
                params![comment_id, post_id],
                Comment::from_row,
            )
            .optional()
        })
        .await
    }
}
