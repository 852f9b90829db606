//! Payment provider port.

use crate::spread::SpreadType;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Placeholder the provider substitutes with the real checkout session id.
pub const CHECKOUT_SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// What to sell and where to send the buyer afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub spread_type: SpreadType,
    /// Provider price identifier for the product.
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Free-form tags attached to the provider session.
    pub metadata: BTreeMap<String, String>,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    /// External page the buyer is redirected to.
    pub url: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Checkout configuration error: {0}")]
    Configuration(String),

    #[error("Checkout request failed: {0}")]
    Transport(String),

    /// The provider rejected the request; `status` is its HTTP status.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Could not retrieve checkout URL")]
    MissingUrl,
}

impl CheckoutError {
    /// HTTP status to report to the caller; provider status when known.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Provider { status, .. } => *status,
            _ => 500,
        }
    }
}

/// Creates hosted checkout pages.
#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}
