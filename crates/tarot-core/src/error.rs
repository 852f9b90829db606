//! Error types for Tarot-AI.

use crate::agent::AgentError;
use crate::checkout::CheckoutError;
use crate::session::WizardError;
use thiserror::Error;

/// A shared error type for the whole service.
///
/// Each variant corresponds to one class of failure the front-ends report
/// differently: validation problems inline, configuration and backend
/// failures with a fixed message.
#[derive(Error, Debug, Clone)]
pub enum TarotError {
    /// Bad input from the querent or the caller.
    #[error("{0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generative backend failure
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Payment provider failure
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Wizard transition refused
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TarotError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Wizard(_))
    }

    /// Missing credentials, either ours or the backend's.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Agent(err) => err.is_configuration(),
            Self::Checkout(err) => matches!(err, CheckoutError::Configuration(_)),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message safe to show the querent. Backend details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Wizard(err) => err.to_string(),
            Self::Agent(err) => err.user_message().to_string(),
            Self::Checkout(CheckoutError::Provider { message, .. }) => message.clone(),
            Self::Checkout(_) => "Could not process payment. Please try again.".to_string(),
            Self::NotFound { .. } => self.to_string(),
            _ => "An unknown error occurred".to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TarotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TarotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TarotError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TarotError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TarotError>`.
pub type Result<T> = std::result::Result<T, TarotError>;
