use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::errors::ApiError;
use crate::state::AppState;

pub mod articles;
pub mod services;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Fallback for a known path hit with the wrong verb.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let article_routes = Router::new()
        .route("/getArticles", get(articles::list_articles).fallback(method_not_allowed))
        .route("/createArticle", post(articles::create_article).fallback(method_not_allowed))
        .route("/getArticle", get(articles::get_article).fallback(method_not_allowed))
        .route("/updateArticle", put(articles::update_article).fallback(method_not_allowed))
        .route("/deleteArticle", delete(articles::delete_article).fallback(method_not_allowed))
        .route("/getServices", get(services::list_services).fallback(method_not_allowed));

    Router::new()
        .route("/health", get(health))
        .merge(article_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
