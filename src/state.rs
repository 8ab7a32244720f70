use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::db::{CommentRepository, PostRepository, SqliteCommentRepository, SqlitePostRepository};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// State backed by the SQLite stores on `pool`.
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            config,
            posts: Arc::new(SqlitePostRepository::new(pool.clone())),
            comments: Arc::new(SqliteCommentRepository::new(pool)),
        }
    }
}
