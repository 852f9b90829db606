//! Configuration types.
//!
//! `config.toml` holds [`AppConfig`]; `secret.json` holds [`SecretConfig`].
//! Loading and env overrides live in the infrastructure crate.

use crate::spread::SpreadType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;
pub const DEFAULT_PRICE_ID: &str = "price_1RCWmoQQsGCeoHVdTz7Lzsvq";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
}

impl SecretConfig {
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.as_str())
            .filter(|k| !k.is_empty())
    }

    pub fn stripe_secret_key(&self) -> Option<&str> {
        self.stripe
            .as_ref()
            .map(|s| s.secret_key.as_str())
            .filter(|k| !k.is_empty())
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Stripe API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeConfig {
    pub secret_key: String,
}

/// Service for loading secrets (API keys).
///
/// Implementations must never log secret values or put them in error messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration. A missing file yields empty secrets.
    async fn load_secrets(&self) -> crate::error::Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reading: ReadingConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Public origin used to build checkout return URLs when the request
    /// carries no `Origin` header.
    pub origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_secs: 60,
        }
    }
}

impl ReadingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Pause between restoring a paid session and calling the backend.
    pub resume_delay_ms: u64,
    /// Seconds the success page waits before forwarding to the reading.
    pub success_redirect_secs: u64,
    /// How long unclaimed drafts and session claims are kept.
    pub resume_ttl_secs: u64,
    #[serde(rename = "product")]
    pub products: Vec<ProductConfig>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            resume_delay_ms: 500,
            success_redirect_secs: 3,
            resume_ttl_secs: 24 * 60 * 60,
            products: ProductConfig::defaults(),
        }
    }
}

impl PaymentConfig {
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn success_redirect_delay(&self) -> Duration {
        Duration::from_secs(self.success_redirect_secs)
    }

    pub fn resume_ttl(&self) -> Duration {
        Duration::from_secs(self.resume_ttl_secs)
    }

    /// Product for a spread, falling back to the single-card product and then
    /// to the built-in defaults.
    pub fn product(&self, spread_type: SpreadType) -> ProductConfig {
        self.products
            .iter()
            .find(|p| p.spread_type == spread_type)
            .or_else(|| {
                self.products
                    .iter()
                    .find(|p| p.spread_type == SpreadType::Single)
            })
            .cloned()
            .unwrap_or_else(|| ProductConfig::default_for(spread_type))
    }
}

/// A purchasable reading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductConfig {
    pub spread_type: SpreadType,
    pub price_id: String,
    pub name: String,
    /// Display price, e.g. `$3.00`.
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ProductConfig {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::default_for(SpreadType::Single),
            Self::default_for(SpreadType::Universal6),
        ]
    }

    pub fn default_for(spread_type: SpreadType) -> Self {
        let (name, features): (&str, &[&str]) = match spread_type {
            SpreadType::Single => (
                "Single Card Tarot Reading",
                &[
                    "Detailed single card interpretation",
                    "Personalized insights",
                    "Unlimited sharing",
                    "Save reading to profile",
                ],
            ),
            SpreadType::Universal6 => (
                "Universal 6 Card Tarot Reading",
                &[
                    "Comprehensive 6-card spread analysis",
                    "Detailed interpretation for each position",
                    "In-depth synthesis of all cards",
                    "Personal guidance for each aspect",
                    "Unlimited sharing",
                    "Save reading to profile",
                ],
            ),
        };
        Self {
            spread_type,
            price_id: DEFAULT_PRICE_ID.to_string(),
            name: name.to_string(),
            price: "$3.00".to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }
}
