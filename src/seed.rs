//! Development seed data.
//!
//! Wipes both tables, resets their autoincrement counters and inserts random
//! posts, each with up to ten comments. Not part of the request path.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::params;

use crate::db::RepositoryError;
use crate::state::DbPool;
use crate::validation::COMMENT_MAX_CHARS;

const SAMPLE_KEYWORDS: &[&str] = &[
    "technology",
    "innovation",
    "design",
    "development",
    "programming",
    "software",
    "hardware",
    "AI",
    "machine learning",
    "data science",
    "cloud computing",
    "cybersecurity",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
    "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui",
    "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

const MAX_COMMENTS_PER_POST: usize = 10;
const POST_AGE_DAYS: i64 = 5;
const COMMENT_AGE_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub posts: usize,
    pub comments: usize,
}

/// Replace all data with `post_count` random posts and their comments.
pub fn seed(pool: &DbPool, post_count: usize) -> Result<SeedSummary, RepositoryError> {
    seed_with_rng(pool, post_count, &mut rand::thread_rng())
}

pub fn seed_with_rng<R: Rng>(
    pool: &DbPool,
    post_count: usize,
    rng: &mut R,
) -> Result<SeedSummary, RepositoryError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tracing::info!("Cleaning existing data");
    tx.execute_batch(
        "DELETE FROM comments;
         DELETE FROM posts;
         DELETE FROM sqlite_sequence WHERE name IN ('posts', 'comments');",
    )?;

    tracing::info!("Inserting {} posts", post_count);
    let now = Utc::now();
    let mut comments = 0;

    for _ in 0..post_count {
        let content = format!("{} {}", sentence(rng, 10, 200), keywords(rng));
        tx.execute(
            "INSERT INTO posts (content, date) VALUES (?1, ?2)",
            params![content, recent(rng, now, POST_AGE_DAYS).timestamp_millis()],
        )?;
        let post_id = tx.last_insert_rowid();

        for _ in 0..rng.gen_range(0..=MAX_COMMENTS_PER_POST) {
            let content = truncate_chars(
                &format!("{} {}", sentence(rng, 5, 100), keywords(rng)),
                COMMENT_MAX_CHARS,
            );
            tx.execute(
                "INSERT INTO comments (content, date, post_id) VALUES (?1, ?2, ?3)",
                params![
                    content,
                    recent(rng, now, COMMENT_AGE_DAYS).timestamp_millis(),
                    post_id
                ],
            )?;
            comments += 1;
        }
    }

    tx.commit()?;
    tracing::info!(posts = post_count, comments, "Seeding completed");

    Ok(SeedSummary {
        posts: post_count,
        comments,
    })
}

/// Capitalised sentence of `min..=max` lorem words ending in a period.
fn sentence<R: Rng>(rng: &mut R, min: usize, max: usize) -> String {
    let count = rng.gen_range(min..=max);
    let mut text = (0..count)
        .map(|_| LOREM[rng.gen_range(0..LOREM.len())])
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_ascii_uppercase();
        text.replace_range(0..1, &upper);
    }
    text.push('.');
    text
}

/// One to three distinct sample keywords.
fn keywords<R: Rng>(rng: &mut R) -> String {
    let amount = rng.gen_range(1..=3);
    SAMPLE_KEYWORDS
        .choose_multiple(rng, amount)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn recent<R: Rng>(rng: &mut R, now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::milliseconds(rng.gen_range(0..days * 86_400_000))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}
