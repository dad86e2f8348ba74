//! Report identifiers and sharded-path utilities.
//!
//! Every report is addressed by a [`ReportId`]: a UUID v4 in *canonical* form, **32 lowercase
//! hexadecimal characters** with no hyphens (`Uuid::new_v4().simple()`).
//!
//! The identifier is the only key callers ever see. Storage backends derive their own internal
//! location from it; the on-disk store uses a sharded layout:
//!
//! `parent_dir/<id[0..2]>/<id[2..4]>/<id>/`
//!
//! Example:
//! `report_data/reports/55/0e/550e8400e29b41d4a716446655440000/`
//!
//! This keeps any single directory from accumulating every report.
//!
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected by
//! [`ReportId::parse`].

mod service;

pub use service::{ReportId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
