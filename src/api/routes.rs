//! API Routes
//!
//! Configures the Axum router with all cachew endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, index_above_handler, index_below_handler,
    index_best_handler, index_delete_handler, index_get_handler, index_highest_handler,
    index_lowest_handler, index_nearest_handler, index_range_handler, index_set_handler,
    set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair
/// - `GET /get/:key` - Retrieve a value by key
/// - `DELETE /del/:key` - Delete a key
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
/// - `PUT /index` - Store a value at a numeric key
/// - `GET /index/get/:key`, `DELETE /index/del/:key` - Exact lookup and removal
/// - `GET /index/{nearest,above,below}?key&count` - Neighbour queries
/// - `GET /index/range?min&max`, `GET /index/best?key` - Range and best match
/// - `GET /index/lowest`, `GET /index/highest` - Extremes
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index_routes = Router::new()
        .route("/", put(index_set_handler))
        .route("/get/:key", get(index_get_handler))
        .route("/del/:key", delete(index_delete_handler))
        .route("/nearest", get(index_nearest_handler))
        .route("/above", get(index_above_handler))
        .route("/below", get(index_below_handler))
        .route("/range", get(index_range_handler))
        .route("/best", get(index_best_handler))
        .route("/lowest", get(index_lowest_handler))
        .route("/highest", get(index_highest_handler));

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .nest("/index", index_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
