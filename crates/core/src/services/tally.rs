//! Vote aggregation.

use futures::future::join_all;
use satya_common::{AppResult, VoteChoice, VoteTally};
use satya_db::repositories::ReportVoteRepository;

/// Computes like/dislike counts from the vote store.
///
/// Counts always reflect the rows present at read time; nothing is cached.
#[derive(Clone)]
pub struct VoteAggregator {
    vote_repo: ReportVoteRepository,
}

impl VoteAggregator {
    /// Create a new vote aggregator.
    #[must_use]
    pub const fn new(vote_repo: ReportVoteRepository) -> Self {
        Self { vote_repo }
    }

    /// Tally the votes on one report. No votes yields `(0, 0)`.
    pub async fn tally(&self, report_id: &str) -> AppResult<VoteTally> {
        let rows = self.vote_repo.find_by_report(report_id).await?;

        let mut tally = VoteTally::default();
        for row in rows {
            match VoteChoice::from_i64(i64::from(row.vote)) {
                Some(choice) => tally.record(choice),
                None => tracing::warn!(
                    report_id = %report_id,
                    vote_id = %row.id,
                    vote = row.vote,
                    "Ignoring vote row with unexpected value"
                ),
            }
        }

        Ok(tally)
    }

    /// Tally many reports concurrently, one result per id in input order.
    ///
    /// A failed read degrades that report's tally to `(0, 0)`.
    pub async fn tally_each<S: AsRef<str>>(&self, report_ids: &[S]) -> Vec<VoteTally> {
        join_all(report_ids.iter().map(|id| async move {
            let id = id.as_ref();
            match self.tally(id).await {
                Ok(tally) => tally,
                Err(e) => {
                    tracing::warn!(report_id = %id, error = %e, "Failed to tally votes, using zero");
                    VoteTally::default()
                }
            }
        }))
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use satya_common::AppError;
    use satya_db::entities::report_vote;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::sync::Arc;

    fn vote(id: &str, voter: &str, value: i16) -> report_vote::Model {
        report_vote::Model {
            id: id.to_string(),
            report_id: "r1".to_string(),
            voter_id: voter.to_string(),
            vote: value,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn aggregator(db: MockDatabase) -> VoteAggregator {
        VoteAggregator::new(ReportVoteRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_tally_classifies_rows() {
        let agg = aggregator(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            vec![
                vote("a", "v_1", 1),
                vote("b", "v_2", 1),
                vote("c", "v_3", -1),
            ],
        ]));

        assert_eq!(agg.tally("r1").await.unwrap(), VoteTally::new(2, 1));
    }

    #[tokio::test]
    async fn test_tally_empty() {
        let agg = aggregator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report_vote::Model>::new()]),
        );

        assert_eq!(agg.tally("r1").await.unwrap(), VoteTally::default());
    }

    #[tokio::test]
    async fn test_tally_surfaces_read_failure() {
        let agg = aggregator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("timeout".to_string())]),
        );

        assert!(matches!(agg.tally("r1").await, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_tally_each_degrades_failed_items() {
        // Futures are polled in order, so the mock answers r1, r2, r3 in turn.
        let agg = aggregator(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![vote("a", "v_1", 1)]])
                .append_query_errors([DbErr::Custom("boom".to_string())])
                .append_query_results([vec![vote("b", "v_1", -1), vote("c", "v_2", -1)]]),
        );

        let tallies = agg.tally_each(&["r1", "r2", "r3"]).await;

        assert_eq!(
            tallies,
            vec![
                VoteTally::new(1, 0),
                VoteTally::default(),
                VoteTally::new(0, 2)
            ]
        );
    }
}
