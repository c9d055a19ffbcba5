//! Vote submission service.

use satya_common::{AppError, AppResult, VoteChoice, VoteRequest, VoteTally};
use satya_db::repositories::{ReportRepository, ReportVoteRepository};
use thiserror::Error;

use crate::services::tally::VoteAggregator;

/// Longest voter id the vote store accepts.
pub const MAX_VOTER_ID_LEN: usize = 128;

/// Why a vote submission was rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteRejection {
    /// The path carried no report id.
    #[error("report id is required")]
    MissingReportId,

    /// The body carried no voter id.
    #[error("voter_id is required")]
    MissingVoterId,

    /// The voter id exceeds [`MAX_VOTER_ID_LEN`].
    #[error("voter_id must be at most {MAX_VOTER_ID_LEN} characters")]
    VoterIdTooLong,

    /// The vote is missing or not one of `1`, `-1`.
    #[error("vote must be 1 or -1")]
    InvalidChoice,
}

impl From<VoteRejection> for AppError {
    fn from(rejection: VoteRejection) -> Self {
        Self::Validation(rejection.to_string())
    }
}

/// A vote that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVote<'a> {
    /// Trimmed report id.
    pub report_id: &'a str,
    /// Trimmed voter id.
    pub voter_id: &'a str,
    /// Parsed choice.
    pub choice: VoteChoice,
}

/// Check a raw submission. Checks run in a fixed order: report id, voter id,
/// then the choice.
pub fn validate_vote<'a>(
    report_id: &'a str,
    request: &'a VoteRequest,
) -> Result<ValidVote<'a>, VoteRejection> {
    let report_id = report_id.trim();
    if report_id.is_empty() {
        return Err(VoteRejection::MissingReportId);
    }

    let voter_id = request
        .voter_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(VoteRejection::MissingVoterId)?;
    if voter_id.chars().count() > MAX_VOTER_ID_LEN {
        return Err(VoteRejection::VoterIdTooLong);
    }

    let choice = request
        .vote
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .and_then(VoteChoice::from_i64)
        .ok_or(VoteRejection::InvalidChoice)?;

    Ok(ValidVote {
        report_id,
        voter_id,
        choice,
    })
}

/// Records anonymous likes and dislikes.
///
/// Each (report, voter) slot moves between unvoted, liked and disliked.
/// Resubmitting the current choice writes nothing.
#[derive(Clone)]
pub struct VoteService {
    report_repo: ReportRepository,
    vote_repo: ReportVoteRepository,
    aggregator: VoteAggregator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        vote_repo: ReportVoteRepository,
        aggregator: VoteAggregator,
    ) -> Self {
        Self {
            report_repo,
            vote_repo,
            aggregator,
        }
    }

    /// Submit a vote and return the report's fresh tally.
    pub async fn submit(&self, report_id: &str, request: &VoteRequest) -> AppResult<VoteTally> {
        let vote = validate_vote(report_id, request)?;

        if self.report_repo.find_by_id(vote.report_id).await?.is_none() {
            return Err(AppError::ReportNotFound(vote.report_id.to_string()));
        }

        let value = i16::from(vote.choice);
        let current = self
            .vote_repo
            .find_by_report_and_voter(vote.report_id, vote.voter_id)
            .await?;

        if current.as_ref().is_some_and(|row| row.vote == value) {
            tracing::debug!(
                report_id = %vote.report_id,
                voter_id = %vote.voter_id,
                "Vote unchanged, skipping write"
            );
        } else {
            self.vote_repo
                .upsert(vote.report_id, vote.voter_id, value)
                .await?;
            tracing::debug!(
                report_id = %vote.report_id,
                voter_id = %vote.voter_id,
                vote = value,
                replaced = current.is_some(),
                "Vote recorded"
            );
        }

        self.aggregator.tally(vote.report_id).await
    }

    /// Current tally of a report.
    pub async fn tally(&self, report_id: &str) -> AppResult<VoteTally> {
        self.aggregator.tally(report_id).await
    }
}
