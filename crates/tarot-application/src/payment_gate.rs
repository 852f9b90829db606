//! Premium checkout and resume after payment.
//!
//! Starting checkout stores the session draft under a fresh resume id and
//! sends only that id through the payment provider. Coming back, the draft is
//! taken from the store and merged with whatever the return URL carries.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tarot_core::checkout::{CHECKOUT_SESSION_PLACEHOLDER, CheckoutGateway, CheckoutRequest};
use tarot_core::config::{PaymentConfig, ProductConfig};
use tarot_core::resume::{self, PartialDraft, ResumeDraft, ResumeParams, ResumeStore};
use tarot_core::{ReadingSession, Result, SpreadType};

/// Result of a started checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutStarted {
    /// Hosted payment page to redirect to.
    pub url: String,
    pub resume_id: String,
}

/// What a resume attempt found.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeOutcome<T = ReadingSession> {
    /// A paid session was restored.
    Resumed(T),
    /// `continue=true` or the checkout session id is missing.
    NotRequested,
    /// This checkout session was already turned into a reading.
    AlreadyResumed,
    /// No draft in the store and not enough on the URL.
    NothingToResume,
}

impl<T> ResumeOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResumeOutcome<U> {
        match self {
            Self::Resumed(value) => ResumeOutcome::Resumed(f(value)),
            Self::NotRequested => ResumeOutcome::NotRequested,
            Self::AlreadyResumed => ResumeOutcome::AlreadyResumed,
            Self::NothingToResume => ResumeOutcome::NothingToResume,
        }
    }

    pub fn is_resumed(&self) -> bool {
        matches!(self, Self::Resumed(_))
    }
}

pub struct PaymentGate {
    gateway: Arc<dyn CheckoutGateway>,
    store: Arc<dyn ResumeStore>,
    config: PaymentConfig,
}

impl PaymentGate {
    pub fn new(
        gateway: Arc<dyn CheckoutGateway>,
        store: Arc<dyn ResumeStore>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    pub fn product(&self, spread_type: SpreadType) -> ProductConfig {
        self.config.product(spread_type)
    }

    pub fn resume_delay(&self) -> Duration {
        self.config.resume_delay()
    }

    pub fn success_redirect_delay(&self) -> Duration {
        self.config.success_redirect_delay()
    }

    /// Persists `draft` and creates a checkout session for its spread.
    ///
    /// The draft must already describe a complete selection, since it is all
    /// the reading will have once payment returns. The stored draft is removed
    /// again if the provider refuses.
    pub async fn begin_checkout(&self, draft: &ResumeDraft, origin: &str) -> Result<CheckoutStarted> {
        ReadingSession::resume(draft)?;

        let origin = origin.trim_end_matches('/');
        let resume_id = resume::new_resume_id();
        let spread_type = draft.spread_type;
        let product = self.product(spread_type);

        self.store.save(&resume_id, &draft.to_entries()).await?;

        let request = CheckoutRequest {
            spread_type,
            price_id: product.price_id,
            success_url: format!(
                "{origin}/success?session_id={CHECKOUT_SESSION_PLACEHOLDER}&readingType={}&resume_id={resume_id}",
                spread_type.as_str()
            ),
            cancel_url: format!("{origin}/canceled"),
            metadata: BTreeMap::from([
                ("readingType".to_string(), spread_type.as_str().to_string()),
                ("resumeId".to_string(), resume_id.clone()),
            ]),
        };

        match self.gateway.create_session(&request).await {
            Ok(session) => {
                tracing::info!(
                    "[Payment] Checkout {} started for {} (resume {})",
                    session.id,
                    spread_type,
                    resume_id
                );
                Ok(CheckoutStarted {
                    url: session.url,
                    resume_id,
                })
            }
            Err(err) => {
                tracing::error!("[Payment] Checkout creation failed: {}", err);
                if let Err(cleanup) = self.store.remove(&resume_id).await {
                    tracing::warn!("[Payment] Could not remove draft {}: {}", resume_id, cleanup);
                }
                Err(err.into())
            }
        }
    }

    /// Drops drafts and session claims older than the configured retention.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.store.purge_older_than(self.config.resume_ttl()).await
    }

    /// Restores the paid session described by the return URL.
    ///
    /// The stored draft is consumed even when the checkout session turns out
    /// to have been resumed already, so a reload finds nothing to resume.
    pub async fn restore(&self, params: &ResumeParams) -> Result<ResumeOutcome> {
        let Some(session_id) = params.session_id().filter(|_| params.wants_continue()) else {
            return Ok(ResumeOutcome::NotRequested);
        };

        let stored = match params.resume_id() {
            Some(resume_id) => self
                .store
                .take(resume_id)
                .await?
                .map(|entries| PartialDraft::from_entries(&entries))
                .unwrap_or_default(),
            None => PartialDraft::default(),
        };

        let Some(draft) = params.to_partial().or(stored).into_draft() else {
            tracing::info!("[Payment] Nothing to resume for checkout {}", session_id);
            return Ok(ResumeOutcome::NothingToResume);
        };

        let session = ReadingSession::resume(&draft)?;

        if !self.store.claim_session(session_id).await? {
            tracing::info!("[Payment] Checkout {} already resumed", session_id);
            return Ok(ResumeOutcome::AlreadyResumed);
        }

        tracing::info!(
            "[Payment] Resumed {} reading with {} card(s) for checkout {}",
            session.spread_type,
            session.selected_card_ids().len(),
            session_id
        );
        Ok(ResumeOutcome::Resumed(session))
    }
}
