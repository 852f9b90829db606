//! Stage transitions for [`ReadingSession`].

use super::model::{ReadingRequest, ReadingSession, ReadingStatus, WizardStage};
use crate::card::{self, Card};
use crate::resume::ResumeDraft;
use crate::spread::{ReadingTier, SpreadType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Action not allowed in {actual:?} stage (expected {expected:?})")]
    InvalidStage {
        expected: WizardStage,
        actual: WizardStage,
    },

    #[error("Please provide {0}")]
    MissingField(&'static str),

    #[error("Unknown card id: {0}")]
    UnknownCard(u8),

    #[error("Spread needs {expected} card(s), {actual} selected")]
    IncompleteSelection { expected: usize, actual: usize },

    #[error("A reading is already in progress")]
    Busy,

    #[error("No reading request is in flight")]
    NotLoading,
}

/// What a card click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSelection {
    /// A card was added; `count` cards are now selected.
    Picked { count: usize },
    /// An already-selected card was clicked; the selection was cut back to
    /// the cards picked before it.
    Truncated { count: usize },
    /// The spread is full and the session moved to `Confirm`.
    Completed,
}

/// What confirming the session asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Call the reading backend with this request.
    RequestReading(ReadingRequest),
    /// Premium session: persist this draft and start checkout instead.
    Checkout(ResumeDraft),
}

impl ReadingSession {
    fn expect_stage(&self, expected: WizardStage) -> Result<(), WizardError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidStage {
                expected,
                actual: self.stage,
            })
        }
    }

    /// `Question` → `Spread`. Both fields are required.
    pub fn submit_question(
        &mut self,
        user_info: &str,
        question: &str,
    ) -> Result<(), WizardError> {
        self.expect_stage(WizardStage::Question)?;
        let user_info = user_info.trim();
        let question = question.trim();
        if user_info.is_empty() {
            return Err(WizardError::MissingField("information about yourself"));
        }
        if question.is_empty() {
            return Err(WizardError::MissingField("a question"));
        }

        self.user_info = user_info.to_string();
        self.question = question.to_string();
        self.stage = WizardStage::Spread;
        Ok(())
    }

    /// `Spread` → `Card`.
    pub fn choose_spread(
        &mut self,
        spread_type: SpreadType,
        tier: ReadingTier,
    ) -> Result<(), WizardError> {
        self.expect_stage(WizardStage::Spread)?;
        self.spread_type = spread_type;
        self.is_premium = tier == ReadingTier::Premium;
        self.selected_card_ids.clear();
        self.stage = WizardStage::Card;
        Ok(())
    }

    /// Handles a click on card `id` while in `Card`.
    pub fn select_card(&mut self, id: u8) -> Result<CardSelection, WizardError> {
        self.expect_stage(WizardStage::Card)?;
        if card::card_by_id(id).is_none() {
            return Err(WizardError::UnknownCard(id));
        }

        if self.spread_type == SpreadType::Single {
            self.selected_card_ids = vec![id];
            self.stage = WizardStage::Confirm;
            return Ok(CardSelection::Completed);
        }

        if let Some(position) = self.selected_card_ids.iter().position(|&c| c == id) {
            self.selected_card_ids.truncate(position);
            return Ok(CardSelection::Truncated { count: position });
        }

        self.selected_card_ids.push(id);
        if self.selection_complete() {
            self.stage = WizardStage::Confirm;
            Ok(CardSelection::Completed)
        } else {
            Ok(CardSelection::Picked {
                count: self.selected_card_ids.len(),
            })
        }
    }

    /// `Confirm` → `Card`, dropping the selection.
    pub fn go_back(&mut self) -> Result<(), WizardError> {
        self.expect_stage(WizardStage::Confirm)?;
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        self.selected_card_ids.clear();
        self.status = ReadingStatus::Idle;
        self.stage = WizardStage::Card;
        Ok(())
    }

    /// Confirms the session.
    ///
    /// Free and already paid sessions switch to `Loading` and hand back the
    /// request to send. Unpaid premium sessions hand back a draft for checkout
    /// and stay in `Confirm`.
    pub fn begin_submit(&mut self) -> Result<SubmitAction, WizardError> {
        self.expect_stage(WizardStage::Confirm)?;
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        if !self.selection_complete() {
            return Err(WizardError::IncompleteSelection {
                expected: self.spread_type.card_count(),
                actual: self.selected_card_ids.len(),
            });
        }

        if self.needs_checkout() {
            return Ok(SubmitAction::Checkout(self.to_draft()));
        }

        let request = self.to_request()?;
        self.status = ReadingStatus::Loading;
        Ok(SubmitAction::RequestReading(request))
    }

    /// Starts the reading request for a session restored after payment.
    pub fn begin_paid_submit(&mut self) -> Result<ReadingRequest, WizardError> {
        self.expect_stage(WizardStage::Confirm)?;
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        let request = self.to_request()?;
        self.status = ReadingStatus::Loading;
        Ok(request)
    }

    /// `Loading` → `Result`.
    pub fn complete(&mut self) -> Result<(), WizardError> {
        if !self.is_busy() {
            return Err(WizardError::NotLoading);
        }
        self.status = ReadingStatus::Idle;
        self.stage = WizardStage::Result;
        Ok(())
    }

    /// `Loading` → `Failed`; the session stays in `Confirm`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        if !self.is_busy() {
            return Err(WizardError::NotLoading);
        }
        self.status = ReadingStatus::Failed(message.into());
        Ok(())
    }

    /// Back to a blank session in `Question`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuilds a premium session in `Confirm` from a checkout draft.
    ///
    /// Single-card drafts keep only their first id.
    pub fn resume(draft: &ResumeDraft) -> Result<Self, WizardError> {
        let mut ids = draft.card_ids.clone();
        if draft.spread_type == SpreadType::Single {
            ids.truncate(1);
        }
        if let Some(&unknown) = ids.iter().find(|&&id| card::card_by_id(id).is_none()) {
            return Err(WizardError::UnknownCard(unknown));
        }

        let session = Self {
            question: draft.question.clone(),
            user_info: draft.user_info.clone(),
            spread_type: draft.spread_type,
            selected_card_ids: ids,
            is_premium: true,
            paid: true,
            stage: WizardStage::Confirm,
            status: ReadingStatus::Idle,
        };
        if !session.selection_complete() {
            return Err(WizardError::IncompleteSelection {
                expected: session.spread_type.card_count(),
                actual: session.selected_card_ids.len(),
            });
        }
        Ok(session)
    }

    /// Snapshot that survives a checkout redirect.
    pub fn to_draft(&self) -> ResumeDraft {
        ResumeDraft {
            question: self.question.clone(),
            user_info: self.user_info.clone(),
            spread_type: self.spread_type,
            card_ids: self.selected_card_ids.clone(),
        }
    }

    fn to_request(&self) -> Result<ReadingRequest, WizardError> {
        let cards: Vec<Card> =
            card::cards_by_ids(&self.selected_card_ids).map_err(WizardError::UnknownCard)?;
        Ok(ReadingRequest {
            cards,
            question: self.question.clone(),
            user_info: self.user_info.clone(),
            spread_type: self.spread_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at_cards(spread_type: SpreadType, tier: ReadingTier) -> ReadingSession {
        let mut session = ReadingSession::new();
        session
            .submit_question("A curious engineer", "What should I focus on?")
            .unwrap();
        session.choose_spread(spread_type, tier).unwrap();
        session
    }

    #[test]
    fn test_question_requires_both_fields() {
        let mut session = ReadingSession::new();
        assert_eq!(
            session.submit_question("  ", "Why?"),
            Err(WizardError::MissingField("information about yourself"))
        );
        assert_eq!(
            session.submit_question("Me", ""),
            Err(WizardError::MissingField("a question"))
        );
        assert_eq!(session.stage(), WizardStage::Question);

        session.submit_question(" Me ", " Why? ").unwrap();
        assert_eq!(session.stage(), WizardStage::Spread);
        assert_eq!(session.question, "Why?");
        assert_eq!(session.user_info, "Me");
    }

    #[test]
    fn test_transitions_reject_wrong_stage() {
        let mut session = ReadingSession::new();
        assert!(matches!(
            session.select_card(1),
            Err(WizardError::InvalidStage {
                expected: WizardStage::Card,
                actual: WizardStage::Question
            })
        ));
        assert!(session.begin_submit().is_err());
        assert!(session.go_back().is_err());
    }

    #[test]
    fn test_single_click_goes_to_confirm() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Free);
        assert_eq!(session.select_card(17), Ok(CardSelection::Completed));
        assert_eq!(session.stage(), WizardStage::Confirm);
        assert_eq!(session.selected_card_ids(), &[17]);
    }

    #[test]
    fn test_unknown_card_is_rejected() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Free);
        assert_eq!(session.select_card(22), Err(WizardError::UnknownCard(22)));
        assert_eq!(session.stage(), WizardStage::Card);
    }

    #[test]
    fn test_universal6_accumulates_and_auto_advances() {
        let mut session = session_at_cards(SpreadType::Universal6, ReadingTier::Free);
        for (i, id) in [4, 8, 15, 16, 18].into_iter().enumerate() {
            assert_eq!(
                session.select_card(id),
                Ok(CardSelection::Picked { count: i + 1 })
            );
            assert_eq!(session.stage(), WizardStage::Card);
        }
        assert_eq!(session.select_card(21), Ok(CardSelection::Completed));
        assert_eq!(session.stage(), WizardStage::Confirm);
        assert_eq!(session.selected_card_ids(), &[4, 8, 15, 16, 18, 21]);
    }

    #[test]
    fn test_repick_truncates_to_position_for_every_k() {
        let picks = [0u8, 1, 2, 3, 4];
        for k in 0..picks.len() {
            let mut session = session_at_cards(SpreadType::Universal6, ReadingTier::Free);
            for id in picks {
                session.select_card(id).unwrap();
            }
            assert_eq!(
                session.select_card(picks[k]),
                Ok(CardSelection::Truncated { count: k })
            );
            assert_eq!(session.selected_card_ids(), &picks[..k]);
            assert_eq!(session.stage(), WizardStage::Card);
        }
    }

    #[test]
    fn test_go_back_clears_selection() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Free);
        session.select_card(3).unwrap();
        session.go_back().unwrap();
        assert_eq!(session.stage(), WizardStage::Card);
        assert!(session.selected_card_ids().is_empty());
    }

    #[test]
    fn test_free_submit_is_single_flight() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Free);
        session.select_card(17).unwrap();

        let action = session.begin_submit().unwrap();
        let SubmitAction::RequestReading(request) = action else {
            panic!("expected a reading request");
        };
        assert_eq!(request.cards[0].name, "The Star");
        assert!(session.is_busy());
        assert_eq!(session.begin_submit(), Err(WizardError::Busy));
        assert_eq!(session.go_back(), Err(WizardError::Busy));

        session.complete().unwrap();
        assert_eq!(session.stage(), WizardStage::Result);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_failure_keeps_confirm_and_allows_reset() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Free);
        session.select_card(1).unwrap();
        session.begin_submit().unwrap();
        session.fail("Failed to fetch from AI service").unwrap();
        assert_eq!(session.stage(), WizardStage::Confirm);
        assert_eq!(
            session.status(),
            &ReadingStatus::Failed("Failed to fetch from AI service".into())
        );

        session.reset();
        assert_eq!(session, ReadingSession::default());
    }

    #[test]
    fn test_premium_submit_returns_draft_and_halts() {
        let mut session = session_at_cards(SpreadType::Single, ReadingTier::Premium);
        session.select_card(9).unwrap();
        let action = session.begin_submit().unwrap();
        assert_eq!(
            action,
            SubmitAction::Checkout(ResumeDraft {
                question: "What should I focus on?".into(),
                user_info: "A curious engineer".into(),
                spread_type: SpreadType::Single,
                card_ids: vec![9],
            })
        );
        assert_eq!(session.stage(), WizardStage::Confirm);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_resume_keeps_first_id_for_single() {
        let draft = ResumeDraft {
            question: "Q".into(),
            user_info: "U".into(),
            spread_type: SpreadType::Single,
            card_ids: vec![3, 7],
        };
        let mut session = ReadingSession::resume(&draft).unwrap();
        assert_eq!(session.selected_card_ids(), &[3]);
        assert!(session.is_premium);
        assert!(session.is_paid());
        assert_eq!(session.stage(), WizardStage::Confirm);

        let request = session.begin_paid_submit().unwrap();
        assert_eq!(request.cards.len(), 1);
        assert_eq!(request.cards[0].id, 3);
    }

    #[test]
    fn test_resume_rejects_short_six_card_draft() {
        let draft = ResumeDraft {
            question: "Q".into(),
            user_info: "U".into(),
            spread_type: SpreadType::Universal6,
            card_ids: vec![1, 2, 3],
        };
        assert_eq!(
            ReadingSession::resume(&draft),
            Err(WizardError::IncompleteSelection {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn test_paid_session_retries_without_checkout() {
        let draft = ResumeDraft {
            question: "Q".into(),
            user_info: "U".into(),
            spread_type: SpreadType::Universal6,
            card_ids: vec![0, 1, 2, 3, 4, 5],
        };
        let mut session = ReadingSession::resume(&draft).unwrap();
        session.begin_paid_submit().unwrap();
        session.fail("The reading service is unavailable").unwrap();

        let Ok(SubmitAction::RequestReading(request)) = session.begin_submit() else {
            panic!("paid session asked for another checkout");
        };
        assert_eq!(request.cards.len(), 6);
        assert!(session.is_busy());

        session.reset();
        assert!(!session.is_paid());
    }

    #[test]
    fn test_completion_requires_loading() {
        let mut session = ReadingSession::new();
        assert_eq!(session.complete(), Err(WizardError::NotLoading));
        assert_eq!(session.fail("x"), Err(WizardError::NotLoading));
    }
}
