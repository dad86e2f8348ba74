//! # MediWhisper Core
//!
//! Report generation and storage for the MediWhisper consultation service.
//!
//! This crate contains the domain logic only:
//! - The three-stage report pipeline driven by a text-completion [`oracle::Oracle`]
//! - Sanitising and schema-checking model output before anything is stored
//! - Report persistence behind [`store::ReportStore`] (sharded JSON files or in-memory)
//! - Markdown rendering of stored reports
//!
//! **No API concerns**: HTTP routing, OpenAPI docs and CLI parsing belong in `api-rest`,
//! `api-shared` and `cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod markdown;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod sanitise;
pub mod store;

pub use config::{CoreConfig, OracleConfig, PipelineConfig, RuntimeConfig, StoreKind};
pub use error::{ReportError, ReportResult, Stage};
pub use mw_types::NonEmptyText;
pub use mw_uuid::ReportId;
pub use pipeline::ReportService;
pub use report::{GeneratedReport, Report};
