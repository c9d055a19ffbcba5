//! Health endpoint.

use axum::{Json, Router, extract::State, routing::get};

use crate::{middleware::AppState, response::HealthResponse};

/// Report whether the database answers. Always 200.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.report_service.ping().await {
        Ok(()) => Json(HealthResponse {
            ok: true,
            db: true,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            Json(HealthResponse {
                ok: true,
                db: false,
                error: Some(e.to_string()),
            })
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
