//! Request validation.
//!
//! Raw input from paths, query strings and JSON bodies is turned into typed,
//! constrained values here before any handler touches the store.

use std::num::IntErrorKind;

/// Maximum length of a comment, in characters.
pub const COMMENT_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} must be {max} characters or less")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be a positive integer")]
    NotPositiveInteger { field: &'static str },

    #[error("{field} must be one of: {allowed}")]
    NotOneOf {
        field: &'static str,
        allowed: &'static str,
    },

    #[error("invalid request: {0}")]
    Malformed(String),
}

/// Content of a post. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content of a comment. Between 1 and [`COMMENT_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }
        if raw.chars().count() > COMMENT_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "content",
                max: COMMENT_MAX_CHARS,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parse a strictly positive integer such as a row id.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ValidationError::NotPositiveInteger { field }),
    }
}

/// Parse a strictly positive integer with no upper bound.
///
/// Values too large for `i64` saturate instead of failing, so an absurd page
/// number still yields an empty page rather than an error.
pub fn parse_unbounded(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(i64::MAX),
        _ => Err(ValidationError::NotPositiveInteger { field }),
    }
}
