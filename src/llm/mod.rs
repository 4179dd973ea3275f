/// Model access — request assembly and the HTTP transport.
///
/// The session talks to the model only through the [`Transport`] trait, so
/// the surfaces can run against [`gemini::GeminiClient`] while tests plug in
/// a scripted fake.
///
/// # Failure model
///
/// A transport call either returns the reply text or a [`TransportError`].
/// The caller turns the error into a visible assistant message; nothing in
/// this module retries. Re-sending is always the student's decision.
use thiserror::Error;

pub mod gemini;
pub mod prompts;

pub use gemini::{GenerateRequest, GeminiClient};

/// Everything that can go wrong between sending a question and reading the
/// reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("API request failed: {status}")]
    Status {
        status: u16,
        /// `error.message` from the body, when the API sent one.
        message: Option<String>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response (HTTP {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },
}

impl TransportError {
    /// HTTP status received, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::MalformedResponse { status, .. } => Some(*status),
            Self::MissingApiKey | Self::Network(_) => None,
        }
    }

    /// Longer description for the event log.
    pub fn detail(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => format!("{self} ({message})"),
            _ => self.to_string(),
        }
    }
}

/// One blocking generation call.
pub trait Transport {
    /// Send `request` authenticated with `api_key` and return the reply text.
    fn complete(&self, api_key: &str, request: &GenerateRequest) -> Result<String, TransportError>;
}
