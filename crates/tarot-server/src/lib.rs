//! HTTP surface for Tarot-AI.
//!
//! Serves the reading endpoint, the checkout endpoint, the post-payment
//! resume flow and the small set of HTML pages the payment provider redirects
//! back to.
//!
//! | Route           | Method | Purpose                                   |
//! |-----------------|--------|-------------------------------------------|
//! | `/`             | GET    | Landing page with the product list        |
//! | `/api/tarot`    | POST   | One reading for the given cards           |
//! | `/api/checkout` | POST   | Start a premium checkout, save the draft  |
//! | `/read`         | GET    | Resume a paid reading                     |
//! | `/success`      | GET    | Payment confirmation, forwards to `/read` |
//! | `/canceled`     | GET    | Payment canceled                          |
//! | `/api/cards`    | GET    | The 22 Major Arcana                       |
//! | `/api/products` | GET    | Purchasable products                      |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::{net::TcpListener, signal, time::MissedTickBehavior};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use tarot_application::{AppContext, PaymentGate};

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use routes::{
    canceled_handler, cards_handler, checkout_handler, index_handler, products_handler,
    read_handler, success_handler, tarot_handler,
};
use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(index_handler))
        .route("/api/tarot", post(tarot_handler))
        .route("/api/checkout", post(checkout_handler))
        .route("/api/cards", get(cards_handler))
        .route("/api/products", get(products_handler))
        .route("/read", get(read_handler))
        .route("/success", get(success_handler))
        .route("/canceled", get(canceled_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// How often the server drops expired resume drafts and session claims.
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn start_server(ctx: AppContext, port: u16) -> anyhow::Result<()> {
    let purge = tokio::spawn(purge_expired_periodically(ctx.payments.clone()));
    let app = router(AppState::new(ctx));

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    purge.abort();
    info!("Server shut down");
    Ok(())
}

async fn purge_expired_periodically(payments: Arc<PaymentGate>) {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; bootstrap has just purged.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match payments.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => info!("Dropped {removed} expired resume record(s)"),
            Err(err) => warn!("Resume purge failed: {err}"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!("Failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
