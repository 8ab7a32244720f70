use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const POST_COLUMNS: &str = "id, content, date";
pub const COMMENT_COLUMNS: &str = "id, content, date, post_id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub date: DateTime<Utc>,
}

impl Post {
    /// Map a row selected with [`POST_COLUMNS`].
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            date: timestamp(row, 2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub date: DateTime<Utc>,
    pub post_id: i64,
}

impl Comment {
    /// Map a row selected with [`COMMENT_COLUMNS`].
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            date: timestamp(row, 2)?,
            post_id: row.get(3)?,
        })
    }
}

// Dates are stored as unix milliseconds
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_serializes_post_id_in_camel_case() {
        let comment = Comment {
            id: 1,
            content: "nice".into(),
            date: DateTime::from_timestamp_millis(0).unwrap(),
            post_id: 9,
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["postId"], 9);
        assert!(json.get("post_id").is_none());
        assert_eq!(json["date"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn timestamp_round_trips_through_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let post = conn
            .query_row("SELECT 3, 'hello', 1700000000123", [], Post::from_row)
            .unwrap();
        assert_eq!(post.id, 3);
        assert_eq!(post.date.timestamp_millis(), 1_700_000_000_123);
    }
}
