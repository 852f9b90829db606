//! Test doubles shared by the application tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tarot_core::agent::{AgentError, ReadingAgent};
use tarot_core::checkout::{CheckoutError, CheckoutGateway, CheckoutRequest, CheckoutSession};

/// Agent that replays a scripted answer and counts calls.
pub struct MockAgent {
    answer: Result<String, AgentError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            answer: Ok(text.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: AgentError) -> Self {
        Self {
            answer: Err(err),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ReadingAgent for MockAgent {
    fn expertise(&self) -> &str {
        "mock tarot reader"
    }

    async fn execute(&self, prompt: &str) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }
}

/// Gateway that records requests and returns a fixed session or error.
pub struct MockGateway {
    result: Result<CheckoutSession, CheckoutError>,
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl MockGateway {
    pub fn ok() -> Self {
        Self {
            result: Ok(CheckoutSession {
                id: "cs_test_1".into(),
                url: "https://checkout.stripe.test/c/pay/cs_test_1".into(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: CheckoutError) -> Self {
        Self {
            result: Err(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MockGateway {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

/// A well-formed six-position answer wrapped in a markdown fence.
pub fn structured_answer() -> String {
    let positions: Vec<String> = (1..=6)
        .map(|n| {
            format!(
                r#"{{"position": {n}, "card": "Card {n}", "description": "Meaning {n}", "interpretation": "Reading {n}"}}"#
            )
        })
        .collect();
    format!(
        "Here is your reading:\n```json\n{{\"positions\": [{}], \"overall\": \"All will be well.\"}}\n```",
        positions.join(", ")
    )
}
