//! Spread layouts and reading tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The card layout a reading uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpreadType {
    /// One card answering the question directly.
    #[default]
    #[serde(rename = "single")]
    Single,
    /// The six-position "Universal 6" layout.
    #[serde(rename = "universal6")]
    Universal6,
}

impl SpreadType {
    /// Number of cards the spread needs before it can be confirmed.
    pub fn card_count(self) -> usize {
        match self {
            SpreadType::Single => 1,
            SpreadType::Universal6 => UNIVERSAL6_POSITIONS.len(),
        }
    }

    /// Wire name used in requests, query strings and checkout metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            SpreadType::Single => "single",
            SpreadType::Universal6 => "universal6",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            SpreadType::Single => "Single Card Reading",
            SpreadType::Universal6 => "Universal 6 Card Spread",
        }
    }

    /// Parses a wire name, treating anything unknown as a single-card reading.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for SpreadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a spread name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown spread type: {0}")]
pub struct UnknownSpread(pub String);

impl FromStr for SpreadType {
    type Err = UnknownSpread;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(SpreadType::Single),
            "universal6" => Ok(SpreadType::Universal6),
            other => Err(UnknownSpread(other.to_string())),
        }
    }
}

/// Whether the reading goes through checkout first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingTier {
    #[default]
    Free,
    Premium,
}

/// One fixed position of the Universal 6 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpreadPosition {
    /// 1-based position number.
    pub number: u8,
    /// Short key naming the aspect the position covers.
    pub key: &'static str,
    /// Description shown to the querent and embedded in the prompt.
    pub description: &'static str,
}

pub const UNIVERSAL6_POSITIONS: [SpreadPosition; 6] = [
    SpreadPosition {
        number: 1,
        key: "self-perception",
        description: "How you feel about yourself now",
    },
    SpreadPosition {
        number: 2,
        key: "desire",
        description: "What you most want at this moment",
    },
    SpreadPosition {
        number: 3,
        key: "fears",
        description: "Your fears",
    },
    SpreadPosition {
        number: 4,
        key: "favorable-factors",
        description: "What is going for you",
    },
    SpreadPosition {
        number: 5,
        key: "unfavorable-factors",
        description: "What is going against you",
    },
    SpreadPosition {
        number: 6,
        key: "outcome",
        description: "The outcome according to your current situation",
    },
];
