/// Gemini `generateContent` client.
///
/// Sends one synchronous `POST {endpoint}/models/{model}:generateContent`
/// per student message using `ureq`, with the API key in the
/// `x-goog-api-key` header.
///
/// The response body is validated against [`GenerateResponse`]; anything
/// that doesn't yield a first candidate with text is a
/// [`TransportError::MalformedResponse`]. Non-2xx statuses surface as
/// [`TransportError::Status`]. Nothing is retried.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Transport, TransportError};
use crate::config::schema::ModelConfig;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Role vocabulary of the generation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

/// A text fragment of a content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
}

/// One role-tagged entry of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Role-less entry, used for the system instruction.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body from `generateContent` (non-streaming).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    /// Text of the first candidate's first part.
    pub fn first_text(&self) -> Result<&str, String> {
        let Some(candidate) = self.candidates.first() else {
            return Err(match self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "response has no candidates".to_string(),
            });
        };

        candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| match candidate.finish_reason.as_deref() {
                Some(reason) => format!("first candidate has no text (finish reason {reason})"),
                None => "first candidate has no text".to_string(),
            })
    }
}

/// Validate a 2xx body and extract the reply text.
pub fn parse_generate_response(status: u16, body: &str) -> Result<String, TransportError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TransportError::MalformedResponse {
            status,
            reason: format!("invalid JSON: {e}"),
        })?;

    parsed
        .first_text()
        .map(str::to_string)
        .map_err(|reason| TransportError::MalformedResponse { status, reason })
}

/// Pull `error.message` out of an error body, if it has one.
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|env| env.error.message)
        .filter(|m| !m.is_empty())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous Gemini HTTP client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from the resolved `[model]` config.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Full URL of the generation call.
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Return the model name for logging.
    pub fn model_name(&self) -> &str {
        &self.model
    }
}

impl Transport for GeminiClient {
    fn complete(&self, api_key: &str, request: &GenerateRequest) -> Result<String, TransportError> {
        let result = ureq::post(&self.url())
            .timeout(self.timeout)
            .set("x-goog-api-key", api_key)
            .send_json(request);

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(TransportError::Status {
                    status,
                    message: api_error_message(&body),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransportError::Network(transport.to_string()));
            }
        };

        let status = resp.status();
        let body = resp
            .into_string()
            .map_err(|e| TransportError::MalformedResponse {
                status,
                reason: format!("failed to read body: {e}"),
            })?;

        parse_generate_response(status, &body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
