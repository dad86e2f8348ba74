use crate::oracle::OracleError;
use crate::store::StoreError;
use std::fmt;

/// The pipeline step an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Completion #1: transcript to SOAP note.
    SoapNote,
    /// Completion #2: SOAP note to differential diagnosis.
    Diagnosis,
    /// Completion #3: transcript to title.
    Title,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SoapNote => "soap_note",
            Stage::Diagnosis => "diagnosis",
            Stage::Title => "title",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("report not found: {0}")]
    NotFound(String),
    #[error("oracle unavailable during {stage} stage: {source}")]
    OracleUnavailable {
        stage: Stage,
        #[source]
        source: OracleError,
    },
    #[error("malformed {stage} generation: {reason}")]
    MalformedGeneration { stage: Stage, reason: String },
    #[error("report storage failed: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl ReportError {
    /// Short machine-friendly label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::InvalidInput(_) => "invalid_input",
            ReportError::NotFound(_) => "not_found",
            ReportError::OracleUnavailable { .. } => "oracle_unavailable",
            ReportError::MalformedGeneration { .. } => "malformed_generation",
            ReportError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_error_names_stage() {
        let err = ReportError::OracleUnavailable {
            stage: Stage::Diagnosis,
            source: OracleError::Timeout,
        };
        assert_eq!(
            err.to_string(),
            "oracle unavailable during diagnosis stage: oracle request timed out"
        );
        assert_eq!(err.kind(), "oracle_unavailable");
    }

    #[test]
    fn malformed_error_names_stage() {
        let err = ReportError::MalformedGeneration {
            stage: Stage::SoapNote,
            reason: "not valid JSON".into(),
        };
        assert_eq!(err.to_string(), "malformed soap_note generation: not valid JSON");
    }
}
