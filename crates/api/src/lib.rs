//! HTTP API layer for satya-matrix.
//!
//! - **Endpoints**: reports, trending, votes, image upload, health
//! - **Extractors**: admin bearer-token authorization, enveloped JSON bodies
//! - **State**: services shared across handlers
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use endpoints::router;
pub use middleware::AppState;

/// Largest accepted JSON body (5 MiB).
pub const JSON_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// The API mounted under `/api`, with body limits, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", router())
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
