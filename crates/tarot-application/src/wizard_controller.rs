//! Drives one querent's reading from question to saved result.

use crate::payment_gate::{CheckoutStarted, PaymentGate, ResumeOutcome};
use crate::reading_service::ReadingService;
use std::sync::Arc;
use tarot_core::resume::ResumeParams;
use tarot_core::session::{CardSelection, SubmitAction};
use tarot_core::{
    ReadingRequest, ReadingResult, ReadingSession, ReadingTier, Result, SpreadType, TarotError,
};

/// What confirming the session led to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Free reading finished.
    Reading(ReadingResult),
    /// Premium reading: send the querent to checkout.
    RedirectTo(CheckoutStarted),
}

/// Owns the session, the current result and the saved history.
///
/// Submission is single-flight: while a request is in flight the session is
/// `Loading` and further submits fail with `WizardError::Busy`.
pub struct WizardController {
    session: ReadingSession,
    result: Option<ReadingResult>,
    history: Vec<ReadingResult>,
    reading: Arc<ReadingService>,
    payments: Option<Arc<PaymentGate>>,
    origin: String,
}

impl WizardController {
    pub fn new(
        reading: Arc<ReadingService>,
        payments: Option<Arc<PaymentGate>>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            session: ReadingSession::new(),
            result: None,
            history: Vec::new(),
            reading,
            payments,
            origin: origin.into(),
        }
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    /// Result of the last completed reading, until saved or discarded.
    pub fn result(&self) -> Option<&ReadingResult> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &[ReadingResult] {
        &self.history
    }

    pub fn premium_available(&self) -> bool {
        self.payments.is_some()
    }

    pub fn submit_question(&mut self, user_info: &str, question: &str) -> Result<()> {
        Ok(self.session.submit_question(user_info, question)?)
    }

    pub fn choose_spread(&mut self, spread_type: SpreadType, tier: ReadingTier) -> Result<()> {
        if tier == ReadingTier::Premium && self.payments.is_none() {
            return Err(TarotError::config("Premium readings are not available"));
        }
        Ok(self.session.choose_spread(spread_type, tier)?)
    }

    pub fn select_card(&mut self, id: u8) -> Result<CardSelection> {
        Ok(self.session.select_card(id)?)
    }

    pub fn go_back(&mut self) -> Result<()> {
        Ok(self.session.go_back()?)
    }

    /// Confirms the session: runs a free reading or starts checkout.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        match self.session.begin_submit()? {
            SubmitAction::RequestReading(request) => {
                self.run(request).await.map(SubmitOutcome::Reading)
            }
            SubmitAction::Checkout(draft) => {
                let payments = self
                    .payments
                    .as_ref()
                    .ok_or_else(|| TarotError::config("Premium readings are not available"))?;
                let started = payments.begin_checkout(&draft, &self.origin).await?;
                Ok(SubmitOutcome::RedirectTo(started))
            }
        }
    }

    /// Restores a paid session from the checkout return URL and reads it.
    ///
    /// Waits the configured resume delay before the single backend call.
    pub async fn resume(&mut self, params: &ResumeParams) -> Result<ResumeOutcome<ReadingResult>> {
        let payments = self
            .payments
            .clone()
            .ok_or_else(|| TarotError::config("Premium readings are not available"))?;

        let session = match payments.restore(params).await? {
            ResumeOutcome::Resumed(session) => session,
            ResumeOutcome::NotRequested => return Ok(ResumeOutcome::NotRequested),
            ResumeOutcome::AlreadyResumed => return Ok(ResumeOutcome::AlreadyResumed),
            ResumeOutcome::NothingToResume => return Ok(ResumeOutcome::NothingToResume),
        };

        self.session = session;
        self.result = None;
        tokio::time::sleep(payments.resume_delay()).await;

        let request = self.session.begin_paid_submit()?;
        let result = self.run(request).await?;
        Ok(ResumeOutcome::Resumed(result))
    }

    /// Appends the current result to the history and starts over.
    pub fn save(&mut self) -> Result<&ReadingResult> {
        let result = self
            .result
            .take()
            .ok_or_else(|| TarotError::validation("There is no reading to save"))?;
        self.history.push(result);
        self.session.reset();
        Ok(&self.history[self.history.len() - 1])
    }

    /// Discards the current session and result.
    pub fn new_reading(&mut self) {
        self.session.reset();
        self.result = None;
    }

    async fn run(&mut self, request: ReadingRequest) -> Result<ReadingResult> {
        match self.reading.read(&request).await {
            Ok(result) => {
                self.session.complete()?;
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(err) => {
                self.session.fail(err.user_message())?;
                Err(err)
            }
        }
    }
}
