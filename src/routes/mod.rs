pub mod comments;
pub mod home;
pub mod posts;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Resource routes, mounted both at the root and under `/api`.
fn resources() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(comments::router())
}

/// The complete application: every route plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(home::health))
        .merge(resources())
        .nest("/api", resources())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
