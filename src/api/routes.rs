use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outermost, so the trace span can read the id
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies", get(handlers::popular_movies))
        .route("/movies/search", get(handlers::search_movies))
        .route("/movies/random", get(handlers::random_movies))
        .route("/movies/:imdb_id", get(handlers::get_movie))
        // Favorites
        .route(
            "/favorites",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route(
            "/favorites/:imdb_id",
            get(handlers::favorite_status).delete(handlers::remove_favorite),
        )
        // Recommendations
        .route("/recommendations", post(handlers::recommend))
        .route(
            "/recommendations/stream",
            get(handlers::stream_recommendations),
        )
}
