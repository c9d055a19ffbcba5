//! Simulated credibility analysis and publish drafts.
//!
//! The analysis is a placeholder: it draws a random reliability score and
//! attaches a fixed set of reasons.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use satya_common::{NewReport, PUBLISHED, SourceType};

/// Reports scoring below this are offered for publishing.
pub const PUBLISH_THRESHOLD: f64 = 60.0;

/// Characters of content kept as the report title.
pub const TITLE_MAX_CHARS: usize = 120;

/// Reasons attached to every simulated analysis.
pub const DEFAULT_REASONS: [&str; 3] = [
    "Source credibility issues",
    "Factual inconsistencies",
    "Emotional language patterns",
];

#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("URL pattern is valid"));

/// Outcome of analysing a piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Score in `[0, 100)`.
    pub reliability: f64,
    /// Why the score is what it is.
    pub reasons: Vec<String>,
}

impl Analysis {
    /// Analysis with a fixed score and the default reasons.
    #[must_use]
    pub fn with_reliability(reliability: f64) -> Self {
        Self {
            reliability,
            reasons: DEFAULT_REASONS.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    /// Chat reply describing the result.
    #[must_use]
    pub fn reply(&self) -> String {
        format!(
            "I've analyzed your news content. Reliability score: {:.1}%",
            self.reliability
        )
    }

    /// Whether the user should be offered to publish the content.
    #[must_use]
    pub fn offers_publish(&self) -> bool {
        self.reliability < PUBLISH_THRESHOLD
    }
}

/// Run the simulated analysis.
#[must_use]
pub fn analyze(content: &str) -> Analysis {
    let reliability = rand::thread_rng().gen_range(0.0..100.0);
    tracing::debug!(chars = content.chars().count(), reliability, "Content analysed");
    Analysis::with_reliability(reliability)
}

/// Classify content by what the user submitted.
#[must_use]
pub fn detect_source_type(text: &str, has_image: bool) -> SourceType {
    if has_image {
        return SourceType::Image;
    }

    if URL_PATTERN.is_match(text) {
        SourceType::Link
    } else {
        SourceType::Headline
    }
}

/// Split a comma separated tag input, dropping blanks.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Content the user chose to publish after an analysis.
#[derive(Debug, Clone)]
pub struct PublishDraft {
    /// Text the user submitted for analysis.
    pub content: String,
    /// Public URL of an uploaded image, if any.
    pub image_url: Option<String>,
    /// Raw comma separated tags as typed.
    pub tags_input: String,
    pub analysis: Analysis,
}

impl PublishDraft {
    /// Build the report payload.
    #[must_use]
    pub fn into_new_report(self) -> NewReport {
        let content = self.content.trim().to_string();
        let source_type = detect_source_type(&content, self.image_url.is_some());
        let title: String = content.chars().take(TITLE_MAX_CHARS).collect();
        let text = (!content.is_empty()).then(|| content.clone());

        NewReport {
            title: Some(title),
            source_type: Some(source_type.as_str().to_string()),
            source_url: None,
            image_url: self.image_url,
            headline: text.clone().filter(|_| source_type == SourceType::Headline),
            link: text.clone().filter(|_| source_type == SourceType::Link),
            analysis_text: text,
            reliability: Some(self.analysis.reliability),
            tags: parse_tags(&self.tags_input),
            reasons: self.analysis.reasons,
            status: Some(PUBLISHED.to_string()),
        }
    }
}
