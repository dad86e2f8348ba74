//! Request and response bodies.
//!
//! Field names match what existing web clients send and expect, so report records serialise in
//! camelCase while the generated clinical documents keep the model's own keys.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/generate-response`.
///
/// `transcript` is optional at the type level so a missing field reaches the handler and is
/// reported as a 400 with the usual error body instead of a framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportReq {
    #[serde(default)]
    #[schema(example = "Patient reports headache for 3 days, worse in morning.")]
    pub transcript: Option<String>,
}

/// A freshly generated report: the stored id plus both parsed documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportRes {
    pub id: String,
    /// SOAP note document.
    #[schema(value_type = Object)]
    pub soap: serde_json::Value,
    /// Differential diagnosis document.
    #[schema(value_type = Object)]
    pub diagnosis: serde_json::Value,
}

/// A stored report.
///
/// `soapNote` and `diagnosis` are the sanitised JSON texts exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRes {
    pub id: String,
    pub title: String,
    pub transcript: String,
    pub soap_note: String,
    pub diagnosis: String,
    /// ISO 8601 with milliseconds, UTC.
    #[schema(example = "2026-01-11T14:35:22.045Z")]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
