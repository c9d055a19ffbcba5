//! Database entities.

#![allow(missing_docs)]

pub mod report;
pub mod report_vote;

pub use report::Entity as Report;
pub use report_vote::Entity as ReportVote;
