//! Report wire types shared by the server and the client.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::vote::VoteTally;

/// Status of reports that appear in the trending feed.
pub const PUBLISHED: &str = "published";

/// Kind of content a report was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// An uploaded screenshot or photo.
    Image,
    /// A pasted headline or free text.
    Headline,
    /// A URL to an article.
    Link,
}

impl SourceType {
    /// Wire name of the source type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Headline => "headline",
            Self::Link => "link",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "headline" => Some(Self::Headline),
            "link" => Some(Self::Link),
            _ => None,
        }
    }
}

/// Body of `POST /reports`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewReport {
    #[validate(length(max = 256))]
    pub title: Option<String>,
    /// One of `image`, `headline`, `link`.
    pub source_type: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub headline: Option<String>,
    pub link: Option<String>,
    pub analysis_text: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub reliability: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Defaults to [`PUBLISHED`].
    pub status: Option<String>,
}

/// A stored report as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub id: String,
    pub title: Option<String>,
    pub source_type: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub headline: Option<String>,
    pub link: Option<String>,
    pub analysis_text: Option<String>,
    pub reliability: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A trending feed entry: the report plus its current tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingReport {
    #[serde(flatten)]
    pub report: ReportView,
    pub likes: u64,
    pub dislikes: u64,
}

impl TrendingReport {
    /// Attach a tally to a report.
    #[must_use]
    pub const fn new(report: ReportView, tally: VoteTally) -> Self {
        Self {
            report,
            likes: tally.likes,
            dislikes: tally.dislikes,
        }
    }

    /// The tally as a value.
    #[must_use]
    pub const fn tally(&self) -> VoteTally {
        VoteTally::new(self.likes, self.dislikes)
    }
}

/// Response of `POST /reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report: ReportView,
}

/// Response of `GET /trending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub reports: Vec<TrendingReport>,
}

/// Response of `POST /upload-image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Public URL of the stored image.
    pub url: String,
    /// Storage key of the stored image.
    pub path: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_validation() {
        let ok = NewReport {
            title: Some("Moon made of cheese".into()),
            reliability: Some(12.5),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let out_of_range = NewReport {
            reliability: Some(140.0),
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());

        let too_long = NewReport {
            title: Some("x".repeat(257)),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_new_report_lists_default_to_empty() {
        let report: NewReport = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(report.tags.is_empty());
        assert!(report.reasons.is_empty());
        assert!(report.status.is_none());
    }

    #[test]
    fn test_trending_report_flattens() {
        let view = ReportView {
            id: "01j0".into(),
            title: Some("t".into()),
            source_type: Some(SourceType::Link.as_str().into()),
            source_url: None,
            image_url: None,
            headline: None,
            link: Some("https://news.test/a".into()),
            analysis_text: None,
            reliability: Some(40.0),
            tags: vec!["#politics".into()],
            reasons: vec![],
            status: PUBLISHED.into(),
            created_at: Utc::now(),
        };
        let item = TrendingReport::new(view, VoteTally::new(2, 1));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "01j0");
        assert_eq!(json["likes"], 2);
        assert_eq!(json["dislikes"], 1);

        let back: TrendingReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.tally(), VoteTally::new(2, 1));
    }

    #[test]
    fn test_source_type_parse() {
        assert_eq!(SourceType::parse("image"), Some(SourceType::Image));
        assert_eq!(SourceType::parse("video"), None);
    }
}
