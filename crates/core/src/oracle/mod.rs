//! Text-completion oracle boundary.
//!
//! The pipeline treats the language model as an opaque function from prompt text to completion
//! text. This module provides:
//! * [`Oracle`]: async trait implemented by every backend.
//! * [`GeminiOracle`]: Google Gemini `generateContent` client.
//! * [`ScriptedOracle`]: replays canned replies; used by tests and offline demos.
//! * [`GenerationConfig`]: fixed sampling parameters sent with every request.
//! * [`OracleError`]: failure variants.

mod gemini;
mod scripted;

pub use gemini::GeminiOracle;
pub use scripted::ScriptedOracle;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while completing a prompt.
#[derive(Debug, Error)]
pub enum OracleError {
    /// No API key was configured for a provider that requires one.
    #[error("oracle API key is not configured")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A single request did not complete within the per-call timeout.
    #[error("oracle request timed out")]
    Timeout,

    /// The overall pipeline deadline ran out before or during this request.
    #[error("pipeline deadline exceeded")]
    DeadlineExceeded,

    /// The response body could not be parsed.
    #[error("failed to parse oracle response: {0}")]
    Parse(String),

    /// The provider refused the prompt.
    #[error("oracle blocked the prompt: {0}")]
    Blocked(String),

    /// The response carried no usable text.
    #[error("oracle returned an empty response")]
    EmptyResponse,
}

impl OracleError {
    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Rate limiting and server-side failures are transient; bad requests, missing credentials and
    /// refusals are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Request(_) | OracleError::Timeout | OracleError::EmptyResponse => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            OracleError::MissingApiKey
            | OracleError::DeadlineExceeded
            | OracleError::Parse(_)
            | OracleError::Blocked(_) => false,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OracleError::Timeout
        } else {
            OracleError::Request(e.to_string())
        }
    }
}

/// Sampling parameters sent with each completion request.
///
/// Serialises with the camelCase keys Gemini expects under `generationConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 4096,
        }
    }
}

/// A stateless text-completion function.
///
/// Implementors must be `Send + Sync` so one instance can be shared by every request handler
/// (usually as `Arc<dyn Oracle>`).
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Complete `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_serialises_camel_case() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(json["topK"], 1);
        assert_eq!(json["maxOutputTokens"], 4096);
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn retryable_classification() {
        assert!(OracleError::Timeout.is_retryable());
        assert!(OracleError::Request("connection reset".into()).is_retryable());
        assert!(OracleError::Status {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(OracleError::Status {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!OracleError::Status {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!OracleError::MissingApiKey.is_retryable());
        assert!(!OracleError::DeadlineExceeded.is_retryable());
    }
}
