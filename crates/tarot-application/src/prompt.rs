//! Prompt templates for the reading backend.
//!
//! Prompts are Jinja templates rendered from typed request structs.

use minijinja::Environment;
use serde::Serialize;
use tarot_core::card::Card;
use tarot_core::spread::UNIVERSAL6_POSITIONS;
use tarot_core::{Result, TarotError};

const SINGLE_CARD: &str = "single_card";
const UNIVERSAL6: &str = "universal6";

const SINGLE_CARD_TEMPLATE: &str = r#"You are a tarot card reader. You will answer the user's question based on the tarot card drawn. The user is {{ user_info }}.
The user has asked: "{{ question }}".
The tarot card drawn is "{{ card }}".
Answer in the language of the user's question.
Please provide a detailed interpretation of the card in relation to the user's question.
The interpretation should be insightful and relevant to the user's situation."#;

const UNIVERSAL6_TEMPLATE: &str = r#"You are an expert tarot card reader. You will interpret the Universal 6 Card Spread.
About the querent: {{ user_info }}
The querent has asked: "{{ question }}"
The Universal 6 Card Spread uses Major Arcana cards to provide a snapshot of the querent's current situation.
Here are the 6 cards drawn in their respective positions:
{% for p in positions -%}
Position {{ p.number }} ({{ p.description }}): {{ p.card }}
{% endfor %}
Interpret each card in its position and how it relates to the querent's question, then provide an overall synthesis.
Answer in the language of the querent's question.
Remember that the first reading is always the most appropriate; emphasize accepting this reading rather than seeking another.

Output ONLY a JSON object matching this shape, no markdown formatting or commentary:
{"positions": [{"position": 1, "card": "<card name>", "description": "<position meaning>", "interpretation": "<text>"}, ...one entry per position 1 to 6...], "overall": "<synthesis>"}"#;

/// Typed request for the single-card prompt.
#[derive(Debug, Clone, Serialize)]
pub struct SingleCardPrompt<'a> {
    pub user_info: &'a str,
    pub question: &'a str,
    pub card: &'a str,
}

/// One line of the six-card prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PositionLine<'a> {
    pub number: u8,
    pub description: &'a str,
    pub card: &'a str,
}

/// Typed request for the Universal 6 prompt.
#[derive(Debug, Clone, Serialize)]
pub struct Universal6Prompt<'a> {
    pub user_info: &'a str,
    pub question: &'a str,
    pub positions: Vec<PositionLine<'a>>,
}

impl<'a> Universal6Prompt<'a> {
    /// Pairs cards with positions in draw order.
    pub fn new(user_info: &'a str, question: &'a str, cards: &'a [Card]) -> Self {
        let positions = UNIVERSAL6_POSITIONS
            .iter()
            .zip(cards)
            .map(|(position, card)| PositionLine {
                number: position.number,
                description: position.description,
                card: card.name,
            })
            .collect();
        Self {
            user_info,
            question,
            positions,
        }
    }
}

/// Holds the compiled templates.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(SINGLE_CARD, SINGLE_CARD_TEMPLATE)
            .map_err(template_error)?;
        env.add_template(UNIVERSAL6, UNIVERSAL6_TEMPLATE)
            .map_err(template_error)?;
        Ok(Self { env })
    }

    pub fn single_card(&self, prompt: &SingleCardPrompt<'_>) -> Result<String> {
        self.render(SINGLE_CARD, prompt)
    }

    pub fn universal6(&self, prompt: &Universal6Prompt<'_>) -> Result<String> {
        self.render(UNIVERSAL6, prompt)
    }

    fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> TarotError {
    TarotError::internal(format!("Prompt template error: {}", err))
}
