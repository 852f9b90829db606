//! Secret service implementation.
//!
//! Reads `secret.json` once and caches it. `GOOGLE_API_KEY` and
//! `STRIPE_SECRET_KEY` override the file.

use crate::config_service::EnvLookup;
use crate::paths::TarotPaths;
use std::path::PathBuf;
use tarot_core::Result;
use tarot_core::config::{GeminiConfig, SecretConfig, SecretService, StripeConfig};
use tokio::sync::RwLock;

pub const GEMINI_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const STRIPE_KEY_ENV: &str = "STRIPE_SECRET_KEY";

pub struct SecretServiceImpl {
    path: PathBuf,
    env: EnvLookup,
    /// Cached secret config loaded from file.
    secrets: RwLock<Option<SecretConfig>>,
}

impl SecretServiceImpl {
    pub fn new(paths: &TarotPaths, env: EnvLookup) -> Self {
        Self {
            path: paths.secret_file(),
            env,
            secrets: RwLock::new(None),
        }
    }

    /// Drops the cache so the next load re-reads the file.
    pub async fn invalidate_cache(&self) {
        *self.secrets.write().await = None;
    }

    async fn read_file(&self) -> Result<SecretConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(SecretConfig::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[Secrets] {} not found", self.path.display());
                Ok(SecretConfig::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn apply_env(&self, secrets: &mut SecretConfig) {
        if let Some(key) = (self.env)(GEMINI_KEY_ENV).filter(|k| !k.is_empty()) {
            match secrets.gemini.as_mut() {
                Some(gemini) => gemini.api_key = key,
                None => {
                    secrets.gemini = Some(GeminiConfig {
                        api_key: key,
                        model_name: None,
                    })
                }
            }
        }
        if let Some(key) = (self.env)(STRIPE_KEY_ENV).filter(|k| !k.is_empty()) {
            secrets.stripe = Some(StripeConfig { secret_key: key });
        }
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut loaded = self.read_file().await?;
        self.apply_env(&mut loaded);
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
