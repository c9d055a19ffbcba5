//! Report service.

use chrono::Utc;
use satya_common::{
    AppError, AppResult, IdGenerator, NewReport, PUBLISHED, ReportView, SharedStorage, SourceType,
    TrendingReport, VoteTally,
};
use satya_db::{
    entities::report,
    repositories::{ReportRepository, ReportVoteRepository},
};
use sea_orm::Set;
use validator::Validate;

use crate::services::auth::Identity;
use crate::services::tally::VoteAggregator;

/// Trending page size when the caller gives none.
pub const DEFAULT_TRENDING_LIMIT: u64 = 20;

/// Largest trending page.
pub const MAX_TRENDING_LIMIT: u64 = 100;

/// Turn a raw `limit` query value into a page size in `1..=100`.
///
/// Absent or unparsable values fall back to the default.
#[must_use]
pub fn clamp_limit(raw: Option<&str>) -> u64 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        None => DEFAULT_TRENDING_LIMIT,
        Some(n) if n < 1 => 1,
        Some(n) => u64::try_from(n).map_or(MAX_TRENDING_LIMIT, |n| n.min(MAX_TRENDING_LIMIT)),
    }
}

/// Convert a stored report into its API shape.
#[must_use]
pub fn report_view(model: report::Model) -> ReportView {
    ReportView {
        id: model.id,
        title: model.title,
        source_type: model.source_type,
        source_url: model.source_url,
        image_url: model.image_url,
        headline: model.headline,
        link: model.link,
        analysis_text: model.analysis_text,
        reliability: model.reliability,
        tags: serde_json::from_value(model.tags).unwrap_or_default(),
        reasons: serde_json::from_value(model.reasons).unwrap_or_default(),
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Creates, lists and deletes reports.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    vote_repo: ReportVoteRepository,
    aggregator: VoteAggregator,
    storage: SharedStorage,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        vote_repo: ReportVoteRepository,
        aggregator: VoteAggregator,
        storage: SharedStorage,
    ) -> Self {
        Self {
            report_repo,
            vote_repo,
            aggregator,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new report.
    pub async fn create(&self, input: NewReport) -> AppResult<ReportView> {
        input.validate()?;

        if let Some(source_type) = input.source_type.as_deref()
            && SourceType::parse(source_type).is_none()
        {
            return Err(AppError::Validation(format!(
                "source_type must be image, headline or link, got {source_type:?}"
            )));
        }

        let status = input
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| PUBLISHED.to_string());

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            source_type: Set(input.source_type),
            source_url: Set(input.source_url),
            image_url: Set(input.image_url),
            headline: Set(input.headline),
            link: Set(input.link),
            analysis_text: Set(input.analysis_text),
            reliability: Set(input.reliability),
            tags: Set(serde_json::Value::from(input.tags)),
            reasons: Set(serde_json::Value::from(input.reasons)),
            status: Set(status),
            created_at: Set(Utc::now().into()),
        };

        let created = self.report_repo.create(model).await?;
        tracing::info!(report_id = %created.id, status = %created.status, "Report created");

        Ok(report_view(created))
    }

    /// Most recent published reports, each with its current tally.
    pub async fn trending(&self, limit: u64) -> AppResult<Vec<TrendingReport>> {
        let limit = limit.clamp(1, MAX_TRENDING_LIMIT);
        let reports = self.report_repo.find_published(limit).await?;

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        let tallies = self.aggregator.tally_each(&ids).await;

        Ok(reports
            .into_iter()
            .zip(tallies)
            .map(|(model, tally)| TrendingReport::new(report_view(model), tally))
            .collect())
    }

    /// Check that the report store answers queries.
    pub async fn ping(&self) -> AppResult<()> {
        self.report_repo.ping().await
    }

    /// Current tally of a report.
    pub async fn votes(&self, report_id: &str) -> AppResult<VoteTally> {
        self.aggregator.tally(report_id).await
    }

    /// Delete a report together with its votes and its image.
    ///
    /// Votes go first, then the image (best effort), then the report row.
    /// Every step tolerates already-missing data, so a retry after a partial
    /// failure completes the deletion.
    pub async fn delete(&self, report_id: &str, actor: &Identity) -> AppResult<()> {
        let report = self.report_repo.get_by_id(report_id).await?;

        let blob_key = report
            .image_url
            .as_deref()
            .and_then(|url| self.storage.key_from_public_url(url));

        let removed_votes = self.vote_repo.delete_by_report(report_id).await?;

        if let Some(key) = blob_key.as_deref()
            && let Err(e) = self.storage.delete(key).await
        {
            tracing::warn!(report_id = %report_id, key = %key, error = %e, "Failed to remove report image");
        }

        self.report_repo.delete(report_id).await?;

        tracing::info!(
            report_id = %report_id,
            actor = %actor.user_id,
            actor_email = ?actor.email,
            removed_votes,
            "Report deleted"
        );

        Ok(())
    }
}
