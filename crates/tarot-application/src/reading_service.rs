//! AI reading client.
//!
//! Turns a [`ReadingRequest`] into a prompt, sends it to the configured
//! [`ReadingAgent`] and normalises the answer into an [`Interpretation`].

use crate::prompt::{PromptRenderer, SingleCardPrompt, Universal6Prompt};
use chrono::Utc;
use std::sync::Arc;
use tarot_core::agent::ReadingAgent;
use tarot_core::card::Card;
use tarot_core::reading::extract_structured;
use tarot_core::{Interpretation, ReadingRequest, ReadingResult, Result, SpreadType, TarotError};

pub const NO_CARDS_MESSAGE: &str = "No cards provided for reading";

pub struct ReadingService {
    agent: Arc<dyn ReadingAgent>,
    prompts: PromptRenderer,
}

impl ReadingService {
    pub fn new(agent: Arc<dyn ReadingAgent>) -> Result<Self> {
        Ok(Self {
            agent,
            prompts: PromptRenderer::new()?,
        })
    }

    /// Produces a complete reading: cards used, inputs and interpretation.
    ///
    /// A Universal 6 request without exactly six cards is read as a
    /// single-card reading of its first card.
    pub async fn read(&self, request: &ReadingRequest) -> Result<ReadingResult> {
        let first = request
            .cards
            .first()
            .copied()
            .ok_or_else(|| TarotError::validation(NO_CARDS_MESSAGE))?;

        let six_card = request.spread_type == SpreadType::Universal6
            && request.cards.len() == SpreadType::Universal6.card_count();

        let (cards, spread_type, interpretation) = if six_card {
            let interpretation = self.interpret_universal6(request).await?;
            (request.cards.clone(), SpreadType::Universal6, interpretation)
        } else {
            if request.spread_type == SpreadType::Universal6 {
                tracing::warn!(
                    "[Reading] universal6 request with {} card(s), reading {} alone",
                    request.cards.len(),
                    first.name
                );
            }
            let interpretation = self.interpret_single(request, &first).await?;
            (vec![first], SpreadType::Single, interpretation)
        };

        Ok(ReadingResult {
            cards,
            spread_type,
            question: request.question.clone(),
            user_info: request.user_info.clone(),
            interpretation,
            timestamp: Utc::now(),
        })
    }

    /// The interpretation alone.
    pub async fn interpret(&self, request: &ReadingRequest) -> Result<Interpretation> {
        Ok(self.read(request).await?.interpretation)
    }

    async fn interpret_single(&self, request: &ReadingRequest, card: &Card) -> Result<Interpretation> {
        let prompt = self.prompts.single_card(&SingleCardPrompt {
            user_info: &request.user_info,
            question: &request.question,
            card: card.name,
        })?;
        let raw = self.execute(&prompt).await?;
        Ok(Interpretation::Narrative(raw))
    }

    async fn interpret_universal6(&self, request: &ReadingRequest) -> Result<Interpretation> {
        let prompt = self.prompts.universal6(&Universal6Prompt::new(
            &request.user_info,
            &request.question,
            &request.cards,
        ))?;
        let raw = self.execute(&prompt).await?;

        match extract_structured(&raw) {
            Ok(reading) => Ok(Interpretation::Structured(reading)),
            Err(err) => {
                tracing::warn!("[Reading] Returning unstructured six-card reading: {}", err);
                Ok(Interpretation::Unstructured(raw))
            }
        }
    }

    async fn execute(&self, prompt: &str) -> Result<String> {
        tracing::debug!("[Reading] Sending prompt to {}", self.agent.expertise());
        self.agent.execute(prompt).await.map_err(|err| {
            tracing::error!(
                "[Reading] Backend failed (retryable: {}): {}",
                err.is_retryable(),
                err
            );
            TarotError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAgent, structured_answer};
    use tarot_core::agent::{AgentError, FETCH_FAILED_MESSAGE};
    use tarot_core::card;

    fn request(ids: &[u8], spread_type: SpreadType) -> ReadingRequest {
        ReadingRequest {
            cards: card::cards_by_ids(ids).unwrap(),
            question: "Will I find love?".into(),
            user_info: "A night-shift baker".into(),
            spread_type,
        }
    }

    #[tokio::test]
    async fn test_single_card_returns_narrative_verbatim() {
        let agent = Arc::new(MockAgent::answering("  The Star brings hope.\n"));
        let service = ReadingService::new(agent.clone()).unwrap();

        let result = service.read(&request(&[17], SpreadType::Single)).await.unwrap();
        assert_eq!(
            result.interpretation,
            Interpretation::Narrative("  The Star brings hope.\n".into())
        );
        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards[0].id, 17);
        assert_eq!(result.cards[0].name, "The Star");
        assert_eq!(agent.calls(), 1);
        assert!(agent.last_prompt().unwrap().contains("The Star"));
    }

    #[tokio::test]
    async fn test_no_cards_fails_before_backend() {
        let agent = Arc::new(MockAgent::answering("unused"));
        let service = ReadingService::new(agent.clone()).unwrap();

        let err = service.read(&request(&[], SpreadType::Single)).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), NO_CARDS_MESSAGE);
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_six_cards_parse_into_positions() {
        let agent = Arc::new(MockAgent::answering(structured_answer()));
        let service = ReadingService::new(agent.clone()).unwrap();

        let result = service
            .read(&request(&[0, 4, 8, 12, 16, 20], SpreadType::Universal6))
            .await
            .unwrap();
        let structured = result.interpretation.as_structured().unwrap();
        let numbers: Vec<u8> = structured.positions.iter().map(|p| p.position).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(!structured.overall.is_empty());
        assert_eq!(result.cards.len(), 6);
        assert!(agent.last_prompt().unwrap().contains("Position 6"));
    }

    #[tokio::test]
    async fn test_six_cards_prose_answer_falls_back_to_unstructured() {
        let prose = "Position 1: calm.\n\nPosition 2: drive.";
        let agent = Arc::new(MockAgent::answering(prose));
        let service = ReadingService::new(agent).unwrap();

        let interpretation = service
            .interpret(&request(&[1, 2, 3, 5, 7, 11], SpreadType::Universal6))
            .await
            .unwrap();
        assert_eq!(interpretation, Interpretation::Unstructured(prose.into()));
        assert!(!interpretation.is_structured());
    }

    #[tokio::test]
    async fn test_short_universal6_reads_first_card_only() {
        let agent = Arc::new(MockAgent::answering("The Empress nurtures."));
        let service = ReadingService::new(agent.clone()).unwrap();

        let result = service
            .read(&request(&[3, 7], SpreadType::Universal6))
            .await
            .unwrap();
        assert_eq!(result.spread_type, SpreadType::Single);
        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards[0].name, "The Empress");
        assert!(agent.last_prompt().unwrap().contains(r#""The Empress""#));
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_fetch_message() {
        let agent = Arc::new(MockAgent::failing(AgentError::Transport {
            message: "connection refused".into(),
            is_retryable: true,
        }));
        let service = ReadingService::new(agent).unwrap();

        let err = service.read(&request(&[17], SpreadType::Single)).await.unwrap_err();
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
    }
}
