//! Client library for satya-matrix.
//!
//! Talks to the report API over HTTP and keeps per-device state:
//!
//! - [`HttpReportClient`]: typed access to every API endpoint
//! - [`VoteReconciler`]: optimistic voting with rollback
//! - [`Feed`]: trending items with local search
//! - [`analysis`]: simulated credibility analysis and publish drafts
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use satya_client::{Feed, FileStore, HttpReportClient, VoteReconciler};
//! use satya_common::VoteChoice;
//!
//! async fn example() -> satya_client::ClientResult<()> {
//!     let gateway = Arc::new(HttpReportClient::new("http://localhost:3000/api"));
//!     let store = Arc::new(FileStore::open("satya-state.json")?);
//!
//!     let feed = Feed::load(gateway.as_ref(), None).await?;
//!     let mut votes = VoteReconciler::new(gateway, store)?;
//!     votes.track(feed.items());
//!     if let Some(first) = feed.items().first() {
//!         votes.vote(&first.report.id, VoteChoice::Like).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod reconciler;
pub mod store;
pub mod voter;

pub use analysis::{Analysis, PublishDraft, analyze};
pub use error::{ClientError, ClientResult};
pub use feed::Feed;
pub use gateway::{HttpReportClient, ReportGateway};
pub use reconciler::{VoteOutcome, VoteReconciler};
pub use store::{FileStore, LocalStore, MemoryStore};
pub use voter::voter_id;
