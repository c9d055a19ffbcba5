//! Report vote repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{ReportVote, report_vote};
use satya_common::{AppError, AppResult, IdGenerator};

/// Report vote repository for database operations.
#[derive(Clone)]
pub struct ReportVoteRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl ReportVoteRepository {
    /// Create a new report vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// All votes cast on a report.
    pub async fn find_by_report(&self, report_id: &str) -> AppResult<Vec<report_vote::Model>> {
        ReportVote::find()
            .filter(report_vote::Column::ReportId.eq(report_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The vote a voter cast on a report, if any.
    pub async fn find_by_report_and_voter(
        &self,
        report_id: &str,
        voter_id: &str,
    ) -> AppResult<Option<report_vote::Model>> {
        ReportVote::find()
            .filter(report_vote::Column::ReportId.eq(report_id))
            .filter(report_vote::Column::VoterId.eq(voter_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote, or replace the choice if the voter already voted.
    ///
    /// Relies on the unique `(report_id, voter_id)` index, so concurrent
    /// submissions for the same slot still leave exactly one row.
    pub async fn upsert(&self, report_id: &str, voter_id: &str, vote: i16) -> AppResult<()> {
        let now = Utc::now();
        let model = report_vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            report_id: Set(report_id.to_string()),
            voter_id: Set(voter_id.to_string()),
            vote: Set(vote),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        ReportVote::insert(model)
            .on_conflict(
                OnConflict::columns([
                    report_vote::Column::ReportId,
                    report_vote::Column::VoterId,
                ])
                .update_columns([report_vote::Column::Vote, report_vote::Column::UpdatedAt])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every vote on a report. Returns the number of rows removed.
    pub async fn delete_by_report(&self, report_id: &str) -> AppResult<u64> {
        ReportVote::delete_many()
            .filter(report_vote::Column::ReportId.eq(report_id))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
