//! API route handlers for the gateway.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use choresync_core::entities::households_path;
use choresync_core::types::{Document, fields_from_json};
use choresync_scheduler::{DocumentCreated, RecordKind, ScanReport};

use super::server::AppState;

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, error: impl std::fmt::Display) -> ApiResponse {
    (
        status,
        Json(serde_json::json!({"ok": false, "error": error.to_string()})),
    )
}

/// Liveness endpoint.
pub async fn hello() -> &'static str {
    "Hello from ChoreSync!"
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "choresync-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Create a chat message record and notify the whole household.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Path((household_id, message_id)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> ApiResponse {
    record_created(&state, RecordKind::Message, household_id, message_id, body).await
}

/// Create a notification record and notify everyone but its sender.
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    Path((household_id, notification_id)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> ApiResponse {
    record_created(&state, RecordKind::Notification, household_id, notification_id, body).await
}

/// Store the record, then run the document-created trigger for it.
async fn record_created(
    state: &AppState,
    kind: RecordKind,
    household_id: String,
    record_id: String,
    body: serde_json::Value,
) -> ApiResponse {
    // Ids become path segments; an encoded '/' would shift the collection path.
    if [&household_id, &record_id].iter().any(|id| id.contains('/')) {
        return api_error(StatusCode::BAD_REQUEST, "Ids must not contain '/'");
    }
    let serde_json::Value::Object(map) = body else {
        return api_error(StatusCode::BAD_REQUEST, "Request body must be a JSON object");
    };
    let fields = match fields_from_json(map) {
        Ok(f) => f,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e),
    };

    let collection = households_path().child(&household_id, kind.collection());
    let doc = Document {
        id: record_id.clone(),
        fields: fields.clone(),
    };
    if let Err(e) = state.store.put(&collection, doc).await {
        tracing::error!("❌ Failed to store {collection}/{record_id}: {e}");
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, e);
    }

    let event = DocumentCreated::new(kind, household_id, record_id, Some(fields));
    match state.notifier.handle(&event).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "outcome": outcome})),
        ),
        Err(e) => {
            tracing::error!(
                "❌ Error notifying household {} for {}: {e}",
                event.household_id,
                event.record_id
            );
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// Run one reminder cycle now.
pub async fn run_scan(State(state): State<Arc<AppState>>) -> Json<ScanReport> {
    Json(state.scanner.run_cycle().await)
}
