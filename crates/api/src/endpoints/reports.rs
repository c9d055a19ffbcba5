//! Report and vote endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use satya_common::{
    AppResult, NewReport, ReportEnvelope, TrendingResponse, VoteRequest, VoteTally,
};
use satya_core::clamp_limit;
use serde::Deserialize;

use crate::{
    extractors::{AdminUser, ApiJson},
    middleware::AppState,
    response::Ack,
};

/// Publish a report.
async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewReport>,
) -> AppResult<Json<ReportEnvelope>> {
    let report = state.report_service.create(input).await?;
    Ok(Json(ReportEnvelope { report }))
}

/// Trending query parameters.
#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    /// Kept as text so bad values fall back to the default page size.
    pub limit: Option<String>,
}

/// Most recent published reports with their tallies.
async fn trending(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<Json<TrendingResponse>> {
    let limit = clamp_limit(query.limit.as_deref());
    let reports = state.report_service.trending(limit).await?;
    Ok(Json(TrendingResponse { reports }))
}

/// Current tally of a report.
async fn votes(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<VoteTally>> {
    Ok(Json(state.report_service.votes(&id).await?))
}

/// Like or dislike a report.
async fn vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> AppResult<Json<VoteTally>> {
    Ok(Json(state.vote_service.submit(&id, &req).await?))
}

/// Delete a report with its votes and image. Admins only.
async fn remove(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Ack>> {
    state.report_service.delete(&id, &admin).await?;
    Ok(Json(Ack::OK))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", post(create))
        .route("/reports/{id}", delete(remove))
        .route("/reports/{id}/votes", get(votes))
        .route("/reports/{id}/vote", post(vote))
        .route("/trending", get(trending))
}
