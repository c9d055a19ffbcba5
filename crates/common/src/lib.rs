//! Common utilities and shared types for satya-matrix.
//!
//! This crate provides foundational components used across all satya crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Storage**: Blob storage backends (local, S3-compatible)
//! - **Wire types**: Reports, votes and tallies shared by server and client
//!
//! # Example
//!
//! ```no_run
//! use satya_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let voter = id_gen.generate_voter_id();
//!     println!("{} listening on {}", voter, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod report;
pub mod storage;
pub mod vote;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use report::{
    NewReport, PUBLISHED, ReportEnvelope, ReportView, SourceType, TrendingReport,
    TrendingResponse, UploadResponse,
};
pub use storage::{
    LocalStorage, MAX_UPLOAD_BYTES, SharedStorage, StorageBackend, StorageConfig, UploadedFile,
    generate_storage_key, is_upload_key,
};
pub use vote::{InvalidVoteChoice, VoteChoice, VoteRequest, VoteTally};
