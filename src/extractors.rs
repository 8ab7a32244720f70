use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::validation::{parse_id, ValidationError};

/// Post id from a `/posts/{id}` path, validated as a positive integer.
#[derive(Debug, Clone, Copy)]
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ValidationError::NotPositiveInteger { field: "postId" })?;

        Ok(Self(parse_id("postId", &id)?))
    }
}

/// Both ids of a `/posts/{id}/comments/{comment_id}` path.
#[derive(Debug, Clone, Copy)]
pub struct CommentPath {
    pub post_id: i64,
    pub comment_id: i64,
}

impl<S> FromRequestParts<S> for CommentPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((post_id, comment_id)): Path<(String, String)> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ValidationError::NotPositiveInteger { field: "commentId" })?;

        Ok(Self {
            post_id: parse_id("postId", &post_id)?,
            comment_id: parse_id("commentId", &comment_id)?,
        })
    }
}

/// `Json` whose rejections are reported as validation errors.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::Malformed(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` whose rejections are reported as validation errors.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ValidationError::Malformed(rejection.body_text()))?;
        Ok(Self(value))
    }
}
