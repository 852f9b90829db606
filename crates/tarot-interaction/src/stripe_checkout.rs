//! Stripe Checkout over its REST API.
//!
//! Sessions are created with a form-encoded POST and the secret key as bearer
//! token. Only the fields the service needs are read back.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tarot_core::checkout::{CheckoutError, CheckoutGateway, CheckoutRequest, CheckoutSession};
use tarot_core::config::SecretConfig;

const API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Clone)]
pub struct StripeCheckoutClient {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
}

impl StripeCheckoutClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: Some(secret_key.into()).filter(|k: &String| !k.is_empty()),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn from_secrets(secrets: &SecretConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: secrets.stripe_secret_key().map(String::from),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_secret_key(&self) -> bool {
        self.secret_key.is_some()
    }
}

/// Form fields for `POST /v1/checkout/sessions`.
fn session_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("line_items[0][price]".to_string(), request.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][adjustable_quantity][enabled]".to_string(),
            "false".to_string(),
        ),
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    form.extend(
        request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value.clone())),
    );
    form
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn map_provider_error(status: u16, body: &str) -> CheckoutError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| "An unknown error occurred".to_string());
    CheckoutError::Provider { status, message }
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or_else(|| CheckoutError::Configuration("Stripe secret key is not configured".into()))?;

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(secret_key)
            .form(&session_form(request))
            .send()
            .await
            .map_err(|err| CheckoutError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CheckoutError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_provider_error(status.as_u16(), &body));
        }

        let session: SessionResponse = serde_json::from_str(&body)
            .map_err(|err| CheckoutError::Transport(format!("Invalid Stripe response: {}", err)))?;
        let url = session.url.filter(|u| !u.is_empty()).ok_or(CheckoutError::MissingUrl)?;

        tracing::info!("[Stripe] Created checkout session {}", session.id);
        Ok(CheckoutSession { id: session.id, url })
    }
}
