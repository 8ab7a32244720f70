//! Post listing: validated listing parameters and the SQL builder behind
//! `GET /posts`.
//!
//! A [`QueryBuilder`] starts empty and accumulates `WHERE` conditions and
//! `ORDER BY` terms. The page query and the count query are rendered from the
//! same predicate so `total` always describes the filtered set, whatever page
//! or ordering was requested.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::db::models::Post;
use crate::validation::{parse_unbounded, ValidationError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw query string of `GET /posts`, before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingParams {
    pub sort: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotOneOf {
                field: "sort",
                allowed: "asc, desc",
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub sort: Option<SortOrder>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            sort: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListingQuery {
    /// Validate raw parameters. Nothing is corrected: a bad value is an error.
    pub fn from_params(params: ListingParams, default_limit: i64) -> Result<Self, ValidationError> {
        let sort = params
            .sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?;
        let page = params
            .page
            .as_deref()
            .map(|raw| parse_unbounded("page", raw))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE);
        let limit = params
            .limit
            .as_deref()
            .map(|raw| parse_unbounded("limit", raw))
            .transpose()?
            .unwrap_or(default_limit);
        let search = params.search.filter(|s| !s.is_empty());

        Ok(Self {
            sort,
            search,
            page,
            limit,
        })
    }

    /// Rows to skip: `(page - 1) * limit`, saturating at `i64::MAX`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Builder holding this query's filter and ordering.
    pub fn builder(&self) -> QueryBuilder {
        let mut builder = QueryBuilder::new();

        if let Some(search) = &self.search {
            builder = builder.filter("content LIKE ? ESCAPE '\\'", contains_pattern(search));
        }

        if let Some(sort) = self.sort {
            builder = builder
                .order_by(format!("date {}", sort.keyword()))
                .order_by(format!("id {}", sort.keyword()));
        }

        builder
    }
}

/// One page of posts plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// Accumulates a predicate and an ordering for a single table.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    params: Vec<Value>,
    order_by: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition with one `?` placeholder. Conditions are ANDed.
    pub fn filter(mut self, condition: impl Into<String>, param: impl Into<Value>) -> Self {
        self.conditions.push(condition.into());
        self.params.push(param.into());
        self
    }

    pub fn order_by(mut self, term: impl Into<String>) -> Self {
        self.order_by.push(term.into());
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// `SELECT` a page of rows; returns the SQL and its bound parameters.
    pub fn select(&self, table: &str, columns: &str, limit: i64, offset: i64) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {}{}", columns, table, self.where_clause());
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut params = self.params.clone();
        params.push(Value::Integer(limit));
        params.push(Value::Integer(offset));
        (sql, params)
    }

    /// `COUNT(*)` of the rows matching the predicate. Ordering is ignored.
    pub fn count(&self, table: &str) -> (String, Vec<Value>) {
        let sql = format!("SELECT COUNT(*) FROM {}{}", table, self.where_clause());
        (sql, self.params.clone())
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
