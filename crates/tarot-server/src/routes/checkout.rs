use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tarot_core::SpreadType;
use tarot_core::resume::ResumeDraft;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(default)]
    pub reading_type: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_info: String,
    #[serde(default)]
    pub card_ids: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub resume_id: String,
}

/// `POST /api/checkout`. Unknown reading types are sold as single-card readings.
pub async fn checkout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let spread_type = body
        .reading_type
        .as_deref()
        .map(SpreadType::parse_lenient)
        .unwrap_or_default();

    let draft = ResumeDraft {
        question: body.question,
        user_info: body.user_info,
        spread_type,
        card_ids: body.card_ids,
    };
    let origin = state.origin(&headers);
    let started = state.ctx.payments.begin_checkout(&draft, &origin).await?;

    Ok(Json(CheckoutResponse {
        url: started.url,
        resume_id: started.resume_id,
    }))
}
