//! API endpoints.

#![allow(missing_docs)]

mod health;
mod reports;
mod uploads;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(uploads::router())
        .merge(reports::router())
}
