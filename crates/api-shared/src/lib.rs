//! # API Shared
//!
//! Wire types shared by the MediWhisper API surfaces.
//!
//! Contains:
//! - Request and response bodies (`dto` module), annotated for OpenAPI
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `mw` CLI's JSON output.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
