//! Shared application state.

#![allow(missing_docs)]

use std::sync::Arc;

use satya_common::SharedStorage;
use satya_core::{Authorizer, MediaService, ReportService, VoteAggregator, VoteService};
use satya_db::repositories::{ReportRepository, ReportVoteRepository};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub vote_service: VoteService,
    pub media_service: MediaService,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: SharedStorage,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let report_repo = ReportRepository::new(Arc::clone(&db));
        let vote_repo = ReportVoteRepository::new(Arc::clone(&db));
        let aggregator = VoteAggregator::new(vote_repo.clone());

        Self {
            report_service: ReportService::new(
                report_repo.clone(),
                vote_repo.clone(),
                aggregator.clone(),
                Arc::clone(&storage),
            ),
            vote_service: VoteService::new(report_repo, vote_repo, aggregator),
            media_service: MediaService::new(storage),
            authorizer,
        }
    }
}
