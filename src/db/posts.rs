// Post store - isolates all post SQL behind a trait
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension};

use crate::db::models::{Post, POST_COLUMNS};
use crate::db::{with_conn, RepositoryError};
use crate::listing::{ListingQuery, PostPage};
use crate::state::DbPool;
use crate::validation::PostContent;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Filtered, sorted page of posts plus the filtered total
    async fn list(&self, query: &ListingQuery) -> Result<PostPage, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<Post>, RepositoryError>;

    /// Insert a post dated now
    async fn create(&self, content: &PostContent) -> Result<Post, RepositoryError>;

    /// Replace the content of a post. `None` leaves it untouched.
    async fn update(
        &self,
        id: i64,
        content: Option<&PostContent>,
    ) -> Result<Option<Post>, RepositoryError>;

    /// Delete a post, returning it. Its comments are left in place.
    async fn delete(&self, id: i64) -> Result<Option<Post>, RepositoryError>;
}

/// SQLite implementation
pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn list(&self, query: &ListingQuery) -> Result<PostPage, RepositoryError> {
        let builder = query.builder();
        let (page_sql, page_params) =
            builder.select("posts", POST_COLUMNS, query.limit, query.offset());
        let (count_sql, count_params) = builder.count("posts");

        // Page and count run on separate connections; either failing fails both
        let posts = with_conn(&self.pool, move |conn| {
            let mut stmt = conn.prepare(&page_sql)?;
            let rows = stmt.query_map(params_from_iter(page_params.iter()), Post::from_row)?;
            let posts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(posts)
        });
        let total = with_conn(&self.pool, move |conn| {
            conn.query_row(&count_sql, params_from_iter(count_params.iter()), |row| {
                row.get::<_, i64>(0)
            })
        });

        let (posts, total) = tokio::try_join!(posts, total)?;

        tracing::debug!(
            page = query.page,
            limit = query.limit,
            returned = posts.len(),
            total,
            "Listed posts"
        );

        Ok(PostPage {
            posts,
            page: query.page,
            limit: query.limit,
            total,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
                params![id],
                Post::from_row,
            )
            .optional()
        })
        .await
    }

    async fn create(&self, content: &PostContent) -> Result<Post, RepositoryError> {
        let content = content.as_str().to_owned();
        let date = Utc::now().timestamp_millis();

        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO posts (content, date) VALUES (?1, ?2) RETURNING {}",
                    POST_COLUMNS
                ),
                params![content, date],
                Post::from_row,
            )
        })
        .await
    }

    async fn update(
        &self,
        id: i64,
        content: Option<&PostContent>,
    ) -> Result<Option<Post>, RepositoryError> {
        let Some(content) = content else {
            return self.get(id).await;
        };
        let content = content.as_str().to_owned();

        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE posts SET content = ?1 WHERE id = ?2 RETURNING {}",
                    POST_COLUMNS
                ),
                params![content, id],
                Post::from_row,
            )
            .optional()
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        with_conn(&self.pool, move |conn| {
            conn.query_row(
                &format!("DELETE FROM posts WHERE id = ?1 RETURNING {}", POST_COLUMNS),
                params![id],
                Post::from_row,
            )
            .optional()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::listing::SortOrder;

    fn content(s: &str) -> PostContent {
        PostContent::parse(s).unwrap()
    }

    fn insert_dated(pool: &DbPool, content: &str, date_millis: i64) {
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO posts (content, date) VALUES (?1, ?2)",
                params![content, date_millis],
            )
            .unwrap();
    }

    #[tokio::test]
    async fn create_then_get() {
        let (_tmp, pool) = test_pool();
        let repo = SqlitePostRepository::new(pool);

        let created = repo.create(&content("hello world")).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.content, "hello world");

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
        assert_eq!(repo.get(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_changes_content_only() {
        let (_tmp, pool) = test_pool();
        let repo = SqlitePostRepository::new(pool);
        let created = repo.create(&content("before")).await.unwrap();

        let updated = repo
            .update(created.id, Some(&content("after")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.content, "after");

        let untouched = repo.update(created.id, None).await.unwrap().unwrap();
        assert_eq!(untouched, updated);

        assert_eq!(repo.update(42, Some(&content("x"))).await.unwrap(), None);
        assert_eq!(repo.update(42, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_returns_deleted_record() {
        let (_tmp, pool) = test_pool();
        let repo = SqlitePostRepository::new(pool);
        let created = repo.create(&content("bye")).await.unwrap();

        assert_eq!(repo.delete(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.delete(created.id).await.unwrap(), None);
        assert_eq!(repo.get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_paginates_and_counts_everything() {
        let (_tmp, pool) = test_pool();
        for i in 0..7 {
            insert_dated(&pool, &format!("post {i}"), 1_000 + i);
        }
        let repo = SqlitePostRepository::new(pool);

        let page = repo
            .list(&ListingQuery {
                page: 2,
                limit: 5,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.total, 7);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 5);

        let past_end = repo
            .list(&ListingQuery {
                page: 100,
                limit: 5,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(past_end.posts.is_empty());
        assert_eq!(past_end.total, 7);
    }

    #[tokio::test]
    async fn list_sorts_by_date() {
        let (_tmp, pool) = test_pool();
        insert_dated(&pool, "middle", 2_000);
        insert_dated(&pool, "oldest", 1_000);
        insert_dated(&pool, "newest", 3_000);
        let repo = SqlitePostRepository::new(pool);

        let contents = |page: PostPage| -> Vec<String> {
            page.posts.into_iter().map(|p| p.content).collect()
        };

        let desc = repo
            .list(&ListingQuery {
                sort: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(contents(desc), ["newest", "middle", "oldest"]);

        let asc = repo
            .list(&ListingQuery {
                sort: Some(SortOrder::Asc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(contents(asc), ["oldest", "middle", "newest"]);

        let unsorted = repo.list(&ListingQuery::default()).await.unwrap();
        assert_eq!(contents(unsorted), ["middle", "oldest", "newest"]);
    }

    #[tokio::test]
    async fn list_filters_by_substring() {
        let (_tmp, pool) = test_pool();
        insert_dated(&pool, "hello world", 1_000);
        insert_dated(&pool, "goodbye", 2_000);
        insert_dated(&pool, "100% sure", 3_000);
        let repo = SqlitePostRepository::new(pool);

        let search = |s: &str| ListingQuery {
            search: Some(s.to_string()),
            ..Default::default()
        };

        let found = repo.list(&search("world")).await.unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.posts[0].content, "hello world");

        let none = repo.list(&search("xyz")).await.unwrap();
        assert!(none.posts.is_empty());
        assert_eq!(none.total, 0);

        // `%` matches literally rather than as a wildcard
        let percent = repo.list(&search("%")).await.unwrap();
        assert_eq!(percent.total, 1);
        assert_eq!(percent.posts[0].content, "100% sure");
    }

    #[tokio::test]
    async fn total_ignores_paging_and_sort() {
        let (_tmp, pool) = test_pool();
        for i in 0..12 {
            let text = if i % 3 == 0 { "rust post" } else { "other post" };
            insert_dated(&pool, text, 1_000 + i);
        }
        let repo = SqlitePostRepository::new(pool);

        for (page, limit, sort) in [
            (1, 10, None),
            (2, 3, Some(SortOrder::Asc)),
            (7, 1, Some(SortOrder::Desc)),
        ] {
            let result = repo
                .list(&ListingQuery {
                    sort,
                    search: Some("rust".into()),
                    page,
                    limit,
                })
                .await
                .unwrap();
            assert_eq!(result.total, 4);
            assert!(result.posts.len() as i64 <= limit);
            assert!(result.posts.iter().all(|p| p.content.contains("rust")));
        }
    }
}
