use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — 200 only while the Discord session is ready.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let connection = state.session.state();
    let status = if connection.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if connection.is_ready() { "ok" } else { "unavailable" },
            "connection": connection,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
