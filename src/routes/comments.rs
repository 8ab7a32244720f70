use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};
use crate::extractors::{CommentPath, PostId, ValidJson};
use crate::state::AppState;
use crate::validation::CommentContent;

#[derive(Deserialize)]
struct CreateCommentRequest {
    content: String,
}

#[derive(Deserialize)]
struct UpdateCommentRequest {
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentList {
    all_comments: Vec<Comment>,
}

/// GET /posts/{id}/comments
async fn list_comments(
    State(state): State<AppState>,
    PostId(post_id): PostId,
) -> AppResult<Json<CommentList>> {
    let all_comments = state.comments.list_for_post(post_id).await?;
    Ok(Json(CommentList { all_comments }))
}

/// GET /posts/{id}/comments/{comment_id}
async fn get_comment(
    State(state): State<AppState>,
    path: CommentPath,
) -> AppResult<Json<Comment>> {
    let comment = state
        .comments
        .get(path.post_id, path.comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    Ok(Json(comment))
}

/// POST /posts/{id}/comments
async fn create_comment(
    State(state): State<AppState>,
    PostId(post_id): PostId,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let content = CommentContent::parse(req.content)?;
    let comment = state
        .comments
        .create(post_id, &content)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    tracing::info!(post_id, comment_id = comment.id, "Created comment");
    Ok(Json(comment))
}

/// PATCH /posts/{id}/comments/{comment_id}
async fn update_comment(
    State(state): State<AppState>,
    path: CommentPath,
    ValidJson(req): ValidJson<UpdateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let content = req.content.map(CommentContent::parse).transpose()?;
    let comment = state
        .comments
        .update(path.post_id, path.comment_id, content.as_ref())
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    Ok(Json(comment))
}

/// DELETE /posts/{id}/comments/{comment_id}
async fn delete_comment(
    State(state): State<AppState>,
    path: CommentPath,
) -> AppResult<Json<Comment>> {
    let comment = state
        .comments
        .delete(path.post_id, path.comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    tracing::info!(
        post_id = path.post_id,
        comment_id = comment.id,
        "Deleted comment"
    );
    Ok(Json(comment))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/comments", get(list_comments).post(create_comment))
        .route(
            "/posts/{id}/comments/{comment_id}",
            get(get_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
}
