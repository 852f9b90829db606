#[cfg(test)]
mod tests {
    use crate::payment_gate::{PaymentGate, ResumeOutcome};
    use crate::reading_service::ReadingService;
    use crate::testing::{MockAgent, MockGateway, structured_answer};
    use crate::wizard_controller::{SubmitOutcome, WizardController};
    use std::sync::Arc;
    use tarot_core::agent::{AgentError, GENERATION_FAILED_MESSAGE};
    use tarot_core::config::PaymentConfig;
    use tarot_core::resume::{ResumeDraft, ResumeParams, ResumeStore};
    use tarot_core::session::{CardSelection, ReadingStatus, WizardError};
    use tarot_core::{ReadingTier, SpreadType, TarotError, WizardStage};
    use tarot_infrastructure::MemoryResumeStore;

    struct Harness {
        agent: Arc<MockAgent>,
        gateway: Arc<MockGateway>,
        store: Arc<MemoryResumeStore>,
        controller: WizardController,
    }

    fn harness(agent: MockAgent) -> Harness {
        let agent = Arc::new(agent);
        let gateway = Arc::new(MockGateway::ok());
        let store = Arc::new(MemoryResumeStore::new());
        let config = PaymentConfig {
            resume_delay_ms: 0,
            ..PaymentConfig::default()
        };
        let reading = Arc::new(ReadingService::new(agent.clone()).unwrap());
        let payments = Arc::new(PaymentGate::new(gateway.clone(), store.clone(), config));
        let controller = WizardController::new(reading, Some(payments), "http://localhost:3000");
        Harness {
            agent,
            gateway,
            store,
            controller,
        }
    }

    fn resume_params(resume_id: &str) -> ResumeParams {
        ResumeParams {
            continue_reading: Some("true".into()),
            session_id: Some("cs_test_42".into()),
            resume_id: Some(resume_id.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_free_single_reading_end_to_end() {
        let mut h = harness(MockAgent::answering("The Star says yes."));
        let c = &mut h.controller;
        c.submit_question("A gardener", "Will I find love?").unwrap();
        c.choose_spread(SpreadType::Single, ReadingTier::Free).unwrap();
        assert_eq!(c.select_card(17).unwrap(), CardSelection::Completed);

        let SubmitOutcome::Reading(result) = c.submit().await.unwrap() else {
            panic!("expected a reading");
        };
        assert_eq!(result.cards[0].name, "The Star");
        assert_eq!(result.interpretation.as_text(), Some("The Star says yes."));
        assert_eq!(c.session().stage(), WizardStage::Result);
        assert_eq!(h.agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_free_six_card_reading_is_structured() {
        let mut h = harness(MockAgent::answering(structured_answer()));
        let c = &mut h.controller;
        c.submit_question("Me", "What now?").unwrap();
        c.choose_spread(SpreadType::Universal6, ReadingTier::Free).unwrap();
        for id in [2, 4, 6, 8, 10, 12] {
            c.select_card(id).unwrap();
        }
        let SubmitOutcome::Reading(result) = c.submit().await.unwrap() else {
            panic!("expected a reading");
        };
        assert_eq!(result.interpretation.sections(6).len(), 6);
    }

    #[tokio::test]
    async fn test_failure_keeps_confirm_and_reports_message() {
        let mut h = harness(MockAgent::failing(AgentError::EmptyResponse("nothing".into())));
        let c = &mut h.controller;
        c.submit_question("Me", "Why?").unwrap();
        c.choose_spread(SpreadType::Single, ReadingTier::Free).unwrap();
        c.select_card(0).unwrap();

        let err = c.submit().await.unwrap_err();
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
        assert_eq!(c.session().stage(), WizardStage::Confirm);
        assert_eq!(
            c.session().status(),
            &ReadingStatus::Failed(GENERATION_FAILED_MESSAGE.into())
        );
        assert!(c.result().is_none());

        // The querent may retry from Confirm.
        assert!(matches!(
            c.submit().await,
            Err(TarotError::Agent(AgentError::EmptyResponse(_)))
        ));
        assert_eq!(h.agent.calls(), 2);
    }

    #[tokio::test]
    async fn test_submit_outside_confirm_is_refused() {
        let mut h = harness(MockAgent::answering("unused"));
        let err = h.controller.submit().await.unwrap_err();
        assert!(matches!(
            err,
            TarotError::Wizard(WizardError::InvalidStage { .. })
        ));
        assert_eq!(h.agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_premium_submit_redirects_without_ai_call() {
        let mut h = harness(MockAgent::answering("unused"));
        let c = &mut h.controller;
        c.submit_question("Me", "Why?").unwrap();
        c.choose_spread(SpreadType::Single, ReadingTier::Premium).unwrap();
        c.select_card(5).unwrap();

        let SubmitOutcome::RedirectTo(started) = c.submit().await.unwrap() else {
            panic!("expected a checkout redirect");
        };
        assert!(started.url.starts_with("https://checkout.stripe.test/"));
        assert_eq!(h.gateway.requests().len(), 1);
        assert_eq!(h.store.len().await, 1);
        assert_eq!(h.agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_resume_reads_first_stored_card_once() {
        let mut h = harness(MockAgent::answering("The Empress reading."));
        let draft = ResumeDraft {
            question: "Q".into(),
            user_info: "U".into(),
            spread_type: SpreadType::Single,
            card_ids: vec![3, 7],
        };
        h.store.save("r-1", &draft.to_entries()).await.unwrap();

        let outcome = h.controller.resume(&resume_params("r-1")).await.unwrap();
        let ResumeOutcome::Resumed(result) = outcome else {
            panic!("expected resume");
        };
        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards[0].id, 3);
        assert!(h.controller.session().is_premium);
        assert_eq!(h.controller.session().selected_card_ids(), &[3]);
        assert_eq!(h.agent.calls(), 1);
        assert!(h.store.is_empty().await);

        // Reload: nothing left, no second call.
        let again = h.controller.resume(&resume_params("r-1")).await.unwrap();
        assert_eq!(again, ResumeOutcome::NothingToResume);
        assert_eq!(h.agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_paid_reading_retries_without_new_checkout() {
        let mut h = harness(MockAgent::failing(AgentError::EmptyResponse("nothing".into())));
        let draft = ResumeDraft {
            question: "Q".into(),
            user_info: "U".into(),
            spread_type: SpreadType::Single,
            card_ids: vec![3],
        };
        h.store.save("r-1", &draft.to_entries()).await.unwrap();

        let err = h.controller.resume(&resume_params("r-1")).await.unwrap_err();
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
        assert!(h.controller.session().is_paid());
        assert_eq!(h.controller.session().stage(), WizardStage::Confirm);

        // Retrying from Confirm goes straight back to the reading service.
        assert!(matches!(
            h.controller.submit().await,
            Err(TarotError::Agent(AgentError::EmptyResponse(_)))
        ));
        assert_eq!(h.agent.calls(), 2);
        assert!(h.gateway.requests().is_empty());
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_appends_history_and_resets() {
        let mut h = harness(MockAgent::answering("Reading."));
        let c = &mut h.controller;
        assert!(c.save().unwrap_err().is_validation());

        c.submit_question("Me", "Why?").unwrap();
        c.choose_spread(SpreadType::Single, ReadingTier::Free).unwrap();
        c.select_card(1).unwrap();
        c.submit().await.unwrap();

        c.save().unwrap();
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.session().stage(), WizardStage::Question);
        assert!(c.result().is_none());

        c.new_reading();
        assert_eq!(c.history().len(), 1);
    }

    #[tokio::test]
    async fn test_premium_unavailable_without_payments() {
        let agent = Arc::new(MockAgent::answering("unused"));
        let reading = Arc::new(ReadingService::new(agent).unwrap());
        let mut c = WizardController::new(reading, None, "http://localhost:3000");
        c.submit_question("Me", "Why?").unwrap();
        assert!(!c.premium_available());
        let err = c
            .choose_spread(SpreadType::Single, ReadingTier::Premium)
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(c.session().stage(), WizardStage::Spread);
    }
}
