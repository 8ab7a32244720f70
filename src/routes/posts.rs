use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::Post;
use crate::error::{AppError, AppResult};
use crate::extractors::{PostId, ValidJson, ValidQuery};
use crate::listing::{ListingParams, ListingQuery, PostPage};
use crate::state::AppState;
use crate::validation::PostContent;

#[derive(Deserialize)]
struct CreatePostRequest {
    content: String,
}

#[derive(Deserialize)]
struct UpdatePostRequest {
    content: Option<String>,
}

/// GET /posts?sort=&search=&page=&limit=
async fn list_posts(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListingParams>,
) -> AppResult<Json<PostPage>> {
    let query = ListingQuery::from_params(params, state.config.listing.default_limit)?;
    let page = state.posts.list(&query).await?;
    Ok(Json(page))
}

/// GET /posts/{id}
async fn get_post(State(state): State<AppState>, PostId(id): PostId) -> AppResult<Json<Post>> {
    let post = state.posts.get(id).await?.ok_or(AppError::NotFound("Post"))?;
    Ok(Json(post))
}

/// POST /posts
async fn create_post(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let content = PostContent::parse(req.content)?;
    let post = state.posts.create(&content).await?;
    tracing::info!(post_id = post.id, "Created post");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /posts/{id}
async fn update_post(
    State(state): State<AppState>,
    PostId(id): PostId,
    ValidJson(req): ValidJson<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let content = req.content.map(PostContent::parse).transpose()?;
    let post = state
        .posts
        .update(id, content.as_ref())
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    Ok(Json(post))
}

/// DELETE /posts/{id}
async fn delete_post(State(state): State<AppState>, PostId(id): PostId) -> AppResult<Json<Post>> {
    let post = state
        .posts
        .delete(id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    tracing::info!(post_id = post.id, "Deleted post");
    Ok(Json(post))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}
