//! Reading result types.

use crate::card::Card;
use crate::spread::SpreadType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interpretation of one card in one position of the six-card spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReading {
    /// 1-based position in the spread.
    pub position: u8,
    /// Card name as the model reported it.
    pub card: String,
    /// What the position stands for.
    #[serde(default)]
    pub description: String,
    pub interpretation: String,
}

/// Per-position breakdown plus an overall synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReading {
    pub positions: Vec<PositionReading>,
    pub overall: String,
}

/// The text a reading produced.
///
/// Serialises untagged: narratives become a JSON string, structured readings an
/// object with `positions` and `overall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Interpretation {
    /// Single-card narrative, returned verbatim.
    Narrative(String),
    /// Six-card reading parsed into positions.
    Structured(StructuredReading),
    /// Six-card reading whose structured form could not be recovered.
    Unstructured(String),
}

impl Interpretation {
    pub fn is_structured(&self) -> bool {
        matches!(self, Interpretation::Structured(_))
    }

    /// Raw text for narrative variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Interpretation::Narrative(text) | Interpretation::Unstructured(text) => Some(text),
            Interpretation::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&StructuredReading> {
        match self {
            Interpretation::Structured(reading) => Some(reading),
            _ => None,
        }
    }

    /// Display sections, one per card.
    ///
    /// Structured readings yield their per-position texts; unstructured six-card
    /// text is split with [`super::split_sections`].
    pub fn sections(&self, card_count: usize) -> Vec<String> {
        match self {
            Interpretation::Structured(reading) => reading
                .positions
                .iter()
                .map(|p| p.interpretation.clone())
                .collect(),
            Interpretation::Unstructured(text) => super::split_sections(text, card_count),
            Interpretation::Narrative(text) => vec![text.clone()],
        }
    }
}

/// A completed reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResult {
    pub cards: Vec<Card>,
    pub spread_type: SpreadType,
    pub question: String,
    pub user_info: String,
    pub interpretation: Interpretation,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}
