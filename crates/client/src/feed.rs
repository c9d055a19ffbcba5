//! Trending feed held on the client.

use satya_common::TrendingReport;

use crate::error::ClientResult;
use crate::gateway::ReportGateway;

/// Locally held trending items.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    items: Vec<TrendingReport>,
}

impl Feed {
    /// Wrap already fetched items.
    #[must_use]
    pub const fn new(items: Vec<TrendingReport>) -> Self {
        Self { items }
    }

    /// Fetch a fresh page from the server.
    pub async fn load(gateway: &dyn ReportGateway, limit: Option<u64>) -> ClientResult<Self> {
        let items = gateway.trending(limit).await?;
        tracing::debug!(count = items.len(), "Trending feed loaded");
        Ok(Self::new(items))
    }

    /// All items, most recent first.
    #[must_use]
    pub fn items(&self) -> &[TrendingReport] {
        &self.items
    }

    /// Drop a report from the feed. Returns whether it was present.
    pub fn remove(&mut self, report_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.report.id != report_id);
        self.items.len() != before
    }

    /// Items whose title, analysis text or tags contain `query`,
    /// case-insensitively. Tags match with or without the leading `#`.
    /// A blank query returns everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&TrendingReport> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }

        self.items
            .iter()
            .filter(|item| matches(item, &needle))
            .collect()
    }
}

fn matches(item: &TrendingReport, needle: &str) -> bool {
    let contains = |text: &Option<String>| {
        text.as_deref()
            .is_some_and(|t| t.to_lowercase().contains(needle))
    };

    contains(&item.report.title)
        || contains(&item.report.analysis_text)
        || item.report.tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            tag.contains(needle) || tag.trim_start_matches('#').contains(needle)
        })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use satya_common::{PUBLISHED, ReportView, VoteTally};

    use super::*;

    fn item(id: &str, title: &str, analysis: Option<&str>, tags: &[&str]) -> TrendingReport {
        TrendingReport::new(
            ReportView {
                id: id.to_string(),
                title: Some(title.to_string()),
                source_type: Some("headline".to_string()),
                source_url: None,
                image_url: None,
                headline: Some(title.to_string()),
                link: None,
                analysis_text: analysis.map(str::to_string),
                reliability: Some(30.0),
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
                reasons: Vec::new(),
                status: PUBLISHED.to_string(),
                created_at: Utc::now(),
            },
            VoteTally::default(),
        )
    }

    fn ids<'a>(found: &[&'a TrendingReport]) -> Vec<&'a str> {
        found.iter().map(|t| t.report.id.as_str()).collect()
    }

    fn feed() -> Feed {
        Feed::new(vec![
            item("a", "Miracle Cure Found", None, &["#health"]),
            item("b", "Election results leaked", Some("Doctored CHART"), &["#politics"]),
            item("c", "Local bakery wins award", None, &["food", "#Local"]),
        ])
    }

    #[test]
    fn test_search_title_and_analysis() {
        let feed = feed();
        assert_eq!(ids(&feed.search("  miracle ")), vec!["a"]);
        assert_eq!(ids(&feed.search("chart")), vec!["b"]);
    }

    #[test]
    fn test_search_tags_with_or_without_hash() {
        let feed = feed();
        assert_eq!(ids(&feed.search("#politics")), vec!["b"]);
        assert_eq!(ids(&feed.search("politics")), vec!["b"]);
        assert_eq!(ids(&feed.search("LOCAL")), vec!["c"]);
        assert_eq!(ids(&feed.search("food")), vec!["c"]);
    }

    #[test]
    fn test_blank_query_and_remove() {
        let mut feed = feed();
        assert_eq!(feed.search("   ").len(), 3);
        assert!(feed.remove("b"));
        assert!(!feed.remove("b"));
        assert!(feed.search("politics").is_empty());
    }
}
