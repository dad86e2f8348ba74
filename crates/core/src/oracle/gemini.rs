//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationConfig, Oracle, OracleError};
use crate::config::OracleConfig;

/// Longest provider error body kept in [`OracleError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Calls `{base_url}/models/{model}:generateContent`.
///
/// Credentials travel in the `x-goog-api-key` header, never in the URL, so request URLs are safe
/// to log.
pub struct GeminiOracle {
    client: reqwest::Client,
    config: OracleConfig,
}

impl GeminiOracle {
    /// Build a client from startup configuration.
    ///
    /// Timeouts are enforced by the pipeline, so the HTTP client itself carries none.
    pub fn from_config(config: &OracleConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Pull the completion text out of a decoded response.
///
/// Text from every part of the first candidate is concatenated; Gemini occasionally splits long
/// answers across parts.
fn extract_text(resp: GenerateContentResponse) -> Result<String, OracleError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(OracleError::Blocked(reason));
    }

    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    Ok(text)
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let key = self.config.api_key.as_deref().unwrap_or("");
        if key.is_empty() {
            return Err(OracleError::MissingApiKey);
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.config.generation,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: error_body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        extract_text(decoded)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
