//! Generative-AI backend port.
//!
//! The application layer only needs "prompt in, text out"; concrete backends
//! (Gemini REST, test doubles) implement [`ReadingAgent`].

use std::time::Duration;
use thiserror::Error;

/// User-facing text for a missing or unusable backend credential.
pub const CONFIGURATION_MESSAGE: &str = "API configuration error: Missing API key";
/// User-facing text when the backend could not be reached.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch from AI service";
/// User-facing text when the backend answered but produced nothing usable.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate content from AI service";

/// Errors raised by a [`ReadingAgent`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Credentials or model settings are missing.
    #[error("Agent configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("Agent request failed: {message}")]
    Transport { message: String, is_retryable: bool },

    /// The backend answered with a non-success status.
    #[error("Agent backend error ({}): {message}", fmt_status(.status_code))]
    Process {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The backend answered but returned no text.
    #[error("Agent returned no text: {0}")]
    EmptyResponse(String),

    #[error("Agent error: {0}")]
    Other(String),
}

impl AgentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether a later attempt could plausibly succeed. Informational only;
    /// nothing in the service retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { is_retryable, .. } | Self::Process { is_retryable, .. } => {
                *is_retryable
            }
            _ => false,
        }
    }

    /// Fixed message safe to show to the querent.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => CONFIGURATION_MESSAGE,
            Self::Transport { .. } => FETCH_FAILED_MESSAGE,
            _ => GENERATION_FAILED_MESSAGE,
        }
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "no status".to_string())
}

/// A text-generation backend.
#[async_trait::async_trait]
pub trait ReadingAgent: Send + Sync {
    /// Short description used in logs.
    fn expertise(&self) -> &str;

    /// Sends a single-turn prompt and returns the raw text answer.
    async fn execute(&self, prompt: &str) -> Result<String, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_details() {
        let err = AgentError::Transport {
            message: "dns error: api.example.invalid".into(),
            is_retryable: true,
        };
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
        assert!(err.is_retryable());

        let err = AgentError::configuration("GOOGLE_API_KEY not set");
        assert_eq!(err.user_message(), CONFIGURATION_MESSAGE);
        assert!(!err.is_retryable());

        let err = AgentError::Process {
            status_code: Some(400),
            message: "INVALID_ARGUMENT: bad".into(),
            is_retryable: false,
            retry_after: None,
        };
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
        assert!(err.to_string().contains("(400)"));
    }
}
