//! Router assembly.

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{delete, get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers::{SharedState, delete_event, get_timeline, health};

/// Builds the application router.
///
/// Endpoints:
/// - GET    /health                    - liveness probe
/// - GET    /api/v1/timeline           - merged timeline for one organization
/// - DELETE /api/v1/events/:event_id   - recurrence-scoped delete
pub fn build_router(state: SharedState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/timeline", get(get_timeline))
        .route("/events/:event_id", delete(delete_event))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_origin(Any);
        router.layer(cors)
    } else {
        router
    }
}
