//! Composition root shared by the server and the terminal client.

use crate::payment_gate::PaymentGate;
use crate::reading_service::ReadingService;
use crate::wizard_controller::WizardController;
use std::path::PathBuf;
use std::sync::Arc;
use tarot_core::Result;
use tarot_core::agent::ReadingAgent;
use tarot_core::checkout::CheckoutGateway;
use tarot_core::config::{AppConfig, SecretService};
use tarot_core::resume::ResumeStore;
use tarot_infrastructure::{
    ConfigService, EnvLookup, FileResumeStore, MemoryResumeStore, SecretServiceImpl, TarotPaths,
};
use tarot_interaction::{GeminiApiAgent, StripeCheckoutClient};

/// How to assemble the services.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Overrides `$TAROT_CONFIG_DIR` and `~/.config/tarot`.
    pub config_dir: Option<PathBuf>,
    /// Keep resume drafts in memory instead of under `resume/`.
    pub memory_store: bool,
}

/// Fully wired services.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub paths: TarotPaths,
    pub reading: Arc<ReadingService>,
    pub payments: Arc<PaymentGate>,
}

impl AppContext {
    /// Loads configuration and secrets and wires the real adapters.
    pub async fn bootstrap(options: &AppOptions, env: EnvLookup) -> Result<Self> {
        let paths = TarotPaths::resolve(options.config_dir.as_deref(), &env)?;
        tracing::info!("[Bootstrap] Config directory: {}", paths.config_dir().display());

        let config = ConfigService::new(paths.clone(), env.clone()).load()?;

        let secret_service = SecretServiceImpl::new(&paths, env);
        if !secret_service.secret_file_exists().await {
            match paths.ensure_secret_file() {
                Ok(path) => tracing::info!("[Bootstrap] Created secret template at {}", path.display()),
                Err(err) => tracing::warn!("[Bootstrap] Could not create secret template: {}", err),
            }
        }
        let secrets = secret_service.load_secrets().await?;

        let agent = GeminiApiAgent::from_config(&secrets, &config.reading);
        if !agent.has_api_key() {
            tracing::warn!("[Bootstrap] Gemini API key missing; readings will fail until it is set");
        }
        tracing::info!("[Bootstrap] Reading model: {}", agent.model());

        let gateway = StripeCheckoutClient::from_secrets(&secrets);
        if !gateway.has_secret_key() {
            tracing::warn!("[Bootstrap] Stripe secret key missing; premium checkout will fail");
        }

        let store: Arc<dyn ResumeStore> = if options.memory_store {
            tracing::info!("[Bootstrap] Using in-memory resume store");
            Arc::new(MemoryResumeStore::new())
        } else {
            Arc::new(FileResumeStore::new(&paths))
        };

        let ctx = Self::from_parts(config, paths, Arc::new(agent), Arc::new(gateway), store)?;
        match ctx.payments.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!("[Bootstrap] Dropped {} expired resume record(s)", removed),
            Err(err) => tracing::warn!("[Bootstrap] Could not purge resume records: {}", err),
        }
        Ok(ctx)
    }

    /// Wires the given adapters. Tests use this with doubles.
    pub fn from_parts(
        config: AppConfig,
        paths: TarotPaths,
        agent: Arc<dyn ReadingAgent>,
        gateway: Arc<dyn CheckoutGateway>,
        store: Arc<dyn ResumeStore>,
    ) -> Result<Self> {
        let reading = Arc::new(ReadingService::new(agent)?);
        let payments = Arc::new(PaymentGate::new(gateway, store, config.payment.clone()));
        Ok(Self {
            config,
            paths,
            reading,
            payments,
        })
    }

    /// Public origin for checkout return URLs, unless the request supplies one.
    pub fn default_origin(&self) -> String {
        self.config
            .server
            .origin
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.config.server.port))
    }

    /// A fresh wizard for one querent.
    pub fn controller(&self, origin: impl Into<String>) -> WizardController {
        WizardController::new(
            self.reading.clone(),
            Some(self.payments.clone()),
            origin,
        )
    }
}
