use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tarot_application::ResumeOutcome;
use tarot_core::resume::ResumeParams;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /read?continue=true&session_id=…`: turns a paid checkout into a reading.
pub async fn read_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ResumeParams>,
) -> Result<Response, ApiError> {
    let mut controller = state.ctx.controller(state.origin(&headers));

    let response = match controller.resume(&params).await? {
        ResumeOutcome::Resumed(reading) => {
            Json(json!({ "resumed": true, "reading": reading })).into_response()
        }
        ResumeOutcome::NotRequested => not_resumed(
            StatusCode::BAD_REQUEST,
            "continue=true and session_id are required",
        ),
        ResumeOutcome::AlreadyResumed => not_resumed(
            StatusCode::CONFLICT,
            "This checkout session has already been used for a reading",
        ),
        ResumeOutcome::NothingToResume => {
            not_resumed(StatusCode::NOT_FOUND, "No saved reading to resume")
        }
    };
    Ok(response)
}

fn not_resumed(status: StatusCode, reason: &str) -> Response {
    (status, Json(json!({ "resumed": false, "reason": reason }))).into_response()
}
