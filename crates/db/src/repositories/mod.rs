//! Database repositories.

mod report;
mod report_vote;

pub use report::ReportRepository;
pub use report_vote::ReportVoteRepository;
