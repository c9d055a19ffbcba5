//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod media;
pub mod report;
pub mod tally;
pub mod vote;

pub use auth::{
    AdminPolicy, Authorization, Authorizer, Identity, IdentityProvider, JwtIdentityProvider,
};
pub use media::MediaService;
pub use report::{ReportService, clamp_limit, report_view};
pub use tally::VoteAggregator;
pub use vote::{VoteRejection, VoteService, validate_vote};
