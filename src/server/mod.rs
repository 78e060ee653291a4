mod api_error;
mod routes;

pub use api_error::{ApiError, ApiErrorResp};
pub use routes::{ExtractResponse, HealthResponse};

use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::fetchers::{BrowserRenderer, PageRenderer};
use crate::notify::{InterestNotifier, ResendNotifier};

/// Shared application state
///
/// Holds strategies only; no browser or page outlives a single request.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn PageRenderer>,
    pub notifier: Arc<dyn InterestNotifier>,
}

impl AppState {
    pub fn new(renderer: Arc<dyn PageRenderer>, notifier: Arc<dyn InterestNotifier>) -> Self {
        Self { renderer, notifier }
    }

    /// The launch strategy is chosen here, once, from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(BrowserRenderer::from_config(&config.browser)),
            Arc::new(ResendNotifier::new(&config.notify)),
        )
    }
}

/// Build the axum router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/extract", post(routes::extract))
        .route("/api/save-interest", post(routes::save_interest))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until ctrl-c
pub async fn serve(config: &AppConfig) -> std::io::Result<()> {
    let state = AppState::from_config(config);
    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(
        "Listening on {} ({} browser strategy)",
        listener.local_addr()?,
        state.renderer.strategy()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
