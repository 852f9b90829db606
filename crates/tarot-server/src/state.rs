use axum::http::{HeaderMap, header::ORIGIN};
use std::sync::Arc;
use tarot_application::AppContext;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
}

impl AppState {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Origin for checkout return URLs: the request's `Origin` header, else
    /// the configured one.
    pub fn origin(&self, headers: &HeaderMap) -> String {
        headers
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .filter(|origin| origin.starts_with("http://") || origin.starts_with("https://"))
            .map(String::from)
            .unwrap_or_else(|| self.ctx.default_origin())
    }
}
