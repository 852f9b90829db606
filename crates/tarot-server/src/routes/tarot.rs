use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tarot_core::card::{self, Card};
use tarot_core::{Interpretation, ReadingRequest, SpreadType};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// A card as the browser sends it; `id` wins over `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardRef {
    #[serde(default)]
    pub id: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CardRef {
    fn resolve(&self) -> Result<Card, ApiError> {
        let found = match (self.id, self.name.as_deref()) {
            (Some(id), _) => card::card_by_id(id),
            (None, Some(name)) => card::card_by_name(name),
            (None, None) => None,
        };
        found.copied().ok_or_else(|| {
            let label = self
                .id
                .map(|id| id.to_string())
                .or_else(|| self.name.clone())
                .unwrap_or_default();
            ApiError::BadRequest(format!("Unknown card: {label}"))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotBody {
    #[serde(default)]
    pub user_info: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub cards: Vec<CardRef>,
    #[serde(default)]
    pub card: Option<CardRef>,
    #[serde(default)]
    pub spread_type: Option<String>,
}

impl TarotBody {
    /// Six cards for a Universal 6 spread; otherwise `card`, then `cards`.
    fn into_request(self) -> Result<ReadingRequest, ApiError> {
        let spread_type = self
            .spread_type
            .as_deref()
            .map(SpreadType::parse_lenient)
            .unwrap_or_default();

        let refs = if spread_type == SpreadType::Universal6
            && self.cards.len() == SpreadType::Universal6.card_count()
        {
            self.cards
        } else if let Some(card) = self.card {
            vec![card]
        } else {
            self.cards
        };

        let cards = refs.iter().map(CardRef::resolve).collect::<Result<Vec<_>, _>>()?;
        Ok(ReadingRequest {
            cards,
            question: self.question,
            user_info: self.user_info,
            spread_type,
        })
    }
}

/// `POST /api/tarot`
pub async fn tarot_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TarotBody>,
) -> Result<Json<Value>, ApiError> {
    let request = body.into_request()?;
    let interpretation = state.ctx.reading.interpret(&request).await?;

    let body = match interpretation {
        Interpretation::Narrative(text) => json!({ "response": text }),
        Interpretation::Structured(reading) => json!({ "response": reading }),
        Interpretation::Unstructured(text) => json!({ "response": text, "structured": false }),
    };
    Ok(Json(body))
}
