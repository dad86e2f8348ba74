//! The persisted report record.

use chrono::{DateTime, SubsecRound, Utc};
use mw_uuid::ReportId;
use serde::{Deserialize, Serialize};

/// A generated report as stored and as returned by lookups.
///
/// `soap_note` and `diagnosis` hold the sanitised JSON *text* produced by the oracle, not parsed
/// structures; [`Report::soap_document`] and [`Report::diagnosis_document`] parse them on demand.
/// Field names serialise in camelCase (`soapNote`) to match the record shape clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub transcript: String,
    pub soap_note: String,
    pub diagnosis: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl Report {
    /// Assemble a new record with a fresh id and the current time.
    ///
    /// The timestamp is truncated to milliseconds so the in-memory value equals what a store
    /// reads back.
    pub fn new(title: String, transcript: String, soap_note: String, diagnosis: String) -> Self {
        Self {
            id: ReportId::new(),
            title,
            transcript,
            soap_note,
            diagnosis,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn soap_document(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.soap_note)
    }

    pub fn diagnosis_document(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.diagnosis)
    }
}

/// Result of a successful pipeline run: the stored record plus the two parsed documents.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub report: Report,
    pub soap: serde_json::Value,
    pub diagnosis: serde_json::Value,
}

/// ISO 8601 with millisecond precision and a `Z` suffix, e.g. `2026-01-11T14:35:22.045Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
