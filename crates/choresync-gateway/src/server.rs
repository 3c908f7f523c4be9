//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use choresync_core::config::GatewayConfig;
use choresync_core::traits::DocumentStore;
use choresync_scheduler::{EventNotifier, ReminderScanner};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    /// Records posted to the trigger endpoints are written here first.
    pub store: Arc<dyn DocumentStore>,
    pub notifier: EventNotifier,
    /// Backs the manual scan endpoint; the scheduled loop shares it.
    pub scanner: Arc<ReminderScanner>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::hello))
        .route("/health", get(super::routes::health_check))
        .route(
            "/api/v1/households/{household_id}/messages/{message_id}",
            post(super::routes::create_message),
        )
        .route(
            "/api/v1/households/{household_id}/notifications/{notification_id}",
            post(super::routes::create_notification),
        )
        .route("/api/v1/reminders/scan", post(super::routes::run_scan))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server. Runs until the listener fails or the task is dropped.
pub async fn start(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.gateway_config.host, state.gateway_config.port);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
