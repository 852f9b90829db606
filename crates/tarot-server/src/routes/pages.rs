use axum::{
    Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::{Environment, Value, context};
use once_cell::sync::Lazy;
use tarot_core::config::ProductConfig;
use tarot_core::resume::ResumeParams;
use tarot_core::{Card, MAJOR_ARCANA, SpreadType};

use crate::error::ApiError;
use crate::state::AppState;

const LAYOUT: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{% block title %}Tarot-AI{% endblock %}</title>
{% block head %}{% endblock %}
</head>
<body>
<main>
{% block body %}{% endblock %}
</main>
</body>
</html>"#;

const INDEX: &str = r#"{% extends "layout.html" %}
{% block body %}
<h1>Tarot-AI</h1>
<p>Ask a question, draw from the 22 Major Arcana, and receive a reading.</p>
{% for product in products %}
<section>
<h2>{{ product.name }} ({{ product.price }})</h2>
<ul>
{% for feature in product.features %}<li>{{ feature }}</li>
{% endfor %}</ul>
</section>
{% endfor %}
<p><a href="/api/cards">Browse the cards</a></p>
{% endblock %}"#;

const SUCCESS: &str = r#"{% extends "layout.html" %}
{% block title %}Payment Successful{% endblock %}
{% block head %}<meta http-equiv="refresh" content="{{ delay_secs }};url={{ read_url }}">{% endblock %}
{% block body %}
<img src="/image/star.png" alt="Success" width="100" height="100">
<h1>Payment Successful!</h1>
<p>Thank you for your purchase! Your premium tarot reading session has been confirmed.</p>
<p><em>"The stars have aligned and your journey awaits..."</em></p>
<p>Redirecting to your reading...</p>
<p><a href="{{ read_url }}">Go to Reading Now</a> <a href="/">Return Home</a></p>
{% endblock %}"#;

const CANCELED: &str = r#"{% extends "layout.html" %}
{% block title %}Payment Canceled{% endblock %}
{% block body %}
<h1>Payment Canceled</h1>
<p>Your payment was canceled. You can still try our basic tarot reading for free, or choose to upgrade to a premium reading whenever you like.</p>
<p><a href="/read">Try Free Reading</a> <a href="/">Return Home</a></p>
{% endblock %}"#;

static PAGES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("layout.html", LAYOUT),
        ("index.html", INDEX),
        ("success.html", SUCCESS),
        ("canceled.html", CANCELED),
    ] {
        if let Err(err) = env.add_template(name, source) {
            tracing::error!("Invalid page template {name}: {err}");
        }
    }
    env
});

fn render(name: &str, ctx: Value) -> Result<Html<String>, ApiError> {
    PAGES
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map(Html)
        .map_err(|err| tarot_core::TarotError::internal(format!("Page render failed: {err}")).into())
}

/// Ids echoed into links must be plain tokens.
fn clean_id(id: Option<&str>) -> Option<&str> {
    id.filter(|id| {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// `/read` URL the success page forwards to.
pub fn read_url(session_id: &str, spread_type: SpreadType, resume_id: Option<&str>) -> String {
    let mut url = format!(
        "/read?continue=true&session_id={session_id}&readingType={}",
        spread_type.as_str()
    );
    if let Some(resume_id) = resume_id {
        url.push_str("&resume_id=");
        url.push_str(resume_id);
    }
    url
}

/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let products: Vec<ProductConfig> = [SpreadType::Single, SpreadType::Universal6]
        .into_iter()
        .map(|spread| state.ctx.payments.product(spread))
        .collect();
    render("index.html", context! { products })
}

/// `GET /success?session_id=…`. Without a session id there is nothing to
/// confirm, so the browser goes home.
pub async fn success_handler(
    State(state): State<AppState>,
    Query(params): Query<ResumeParams>,
) -> Result<Response, ApiError> {
    let Some(session_id) = clean_id(params.session_id()) else {
        return Ok(Redirect::to("/").into_response());
    };
    let spread_type = params
        .reading_type
        .as_deref()
        .map(SpreadType::parse_lenient)
        .unwrap_or_default();
    // Every interpolated piece is a plain token, so the URL needs no escaping.
    let read_url = Value::from_safe_string(read_url(
        session_id,
        spread_type,
        clean_id(params.resume_id()),
    ));
    let delay_secs = state.ctx.payments.success_redirect_delay().as_secs();

    Ok(render("success.html", context! { read_url, delay_secs })?.into_response())
}

/// `GET /canceled`
pub async fn canceled_handler() -> Result<Html<String>, ApiError> {
    render("canceled.html", context! {})
}

/// `GET /api/cards`
pub async fn cards_handler() -> Json<&'static [Card]> {
    Json(&MAJOR_ARCANA[..])
}

/// `GET /api/products`
pub async fn products_handler(State(state): State<AppState>) -> Json<Vec<ProductConfig>> {
    Json(
        [SpreadType::Single, SpreadType::Universal6]
            .into_iter()
            .map(|spread| state.ctx.payments.product(spread))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_url_carries_resume_id() {
        assert_eq!(
            read_url("cs_test_1", SpreadType::Universal6, Some("r-1")),
            "/read?continue=true&session_id=cs_test_1&readingType=universal6&resume_id=r-1"
        );
        assert_eq!(
            read_url("cs_test_1", SpreadType::Single, None),
            "/read?continue=true&session_id=cs_test_1&readingType=single"
        );
    }

    #[test]
    fn test_clean_id_rejects_markup() {
        assert_eq!(clean_id(Some("cs_test_a1")), Some("cs_test_a1"));
        assert_eq!(clean_id(Some("\"><script>")), None);
        assert_eq!(clean_id(None), None);
    }

    #[test]
    fn test_pages_render() {
        let html = render("canceled.html", context! {}).unwrap().0;
        assert!(html.contains("Payment Canceled"));
        assert!(html.contains(r#"href="/read""#));
    }
}
