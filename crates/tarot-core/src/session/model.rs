//! Reading session state.

use crate::card::Card;
use crate::spread::SpreadType;
use serde::Serialize;

/// Wizard stages, in the order a reading walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStage {
    /// Collecting the querent's self-description and question.
    #[default]
    Question,
    /// Choosing the spread and tier.
    Spread,
    /// Picking cards.
    Card,
    /// Reviewing the picked cards before submission.
    Confirm,
    /// Showing the finished reading.
    Result,
}

/// Network sub-state while moving from `Confirm` to `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Idle,
    /// A reading request is in flight; further submissions are refused.
    Loading,
    /// The last request failed with a user-facing message.
    Failed(String),
}

/// The querent's in-progress reading.
///
/// Mutated only through the transition methods in `wizard.rs`, which keep the
/// selection length consistent with the spread type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub question: String,
    pub user_info: String,
    pub spread_type: SpreadType,
    pub(crate) selected_card_ids: Vec<u8>,
    pub is_premium: bool,
    /// Set once checkout has completed for this session.
    pub(crate) paid: bool,
    pub(crate) stage: WizardStage,
    pub(crate) status: ReadingStatus,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn status(&self) -> &ReadingStatus {
        &self.status
    }

    /// Selected ids in click order.
    pub fn selected_card_ids(&self) -> &[u8] {
        &self.selected_card_ids
    }

    /// Whether this premium session has already been paid for.
    pub fn is_paid(&self) -> bool {
        self.paid
    }

    /// Whether submitting would start a checkout.
    pub fn needs_checkout(&self) -> bool {
        self.is_premium && !self.paid
    }

    /// Whether a reading request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.status, ReadingStatus::Loading)
    }

    /// Whether the selection satisfies the spread.
    pub fn selection_complete(&self) -> bool {
        self.selected_card_ids.len() == self.spread_type.card_count()
    }
}

/// Everything the AI reading client needs for one reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingRequest {
    pub cards: Vec<Card>,
    pub question: String,
    pub user_info: String,
    pub spread_type: SpreadType,
}
