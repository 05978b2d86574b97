//! HTTP surface: router construction and CORS policy.

pub mod routes;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::AppContext;

/// Build the service router. With no configured origins the CORS layer is
/// fully permissive; otherwise only the listed origins are allowed.
pub fn create_router(ctx: Arc<AppContext>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/generate-lesson-plan", post(routes::generate_lesson_plan))
        .route("/strands/:subject", get(routes::strands))
        .route("/sub-strands/:subject/:strand", get(routes::sub_strands))
        .route("/curriculum/:subject", get(routes::curriculum))
        .route("/metrics", get(routes::metrics))
        .layer(cors_layer(allowed_origins))
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(Any)
        .allow_headers(Any)
}
