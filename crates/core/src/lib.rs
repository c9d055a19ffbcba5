//! Core business logic for satya-matrix.
//!
//! Vote aggregation, vote submission, report lifecycle, admin authorization
//! and media uploads.

pub mod services;

pub use services::*;
