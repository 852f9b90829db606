use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tarot_core::TarotError;
use thiserror::Error;
use tracing::error;

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Tarot(#[from] TarotError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Tarot(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Tarot(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Tarot(TarotError::Checkout(err)) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Tarot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to send to the browser.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Tarot(err) => err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {status}: {self}");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
