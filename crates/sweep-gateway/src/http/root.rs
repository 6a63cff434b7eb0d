use axum::Json;
use serde_json::{json, Value};

/// GET / — service metadata.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "sweep",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /delete-discord-message": "Delete webhook messages matching product name, SKU and size",
            "GET /health": "Liveness probe for the Discord session",
        },
    }))
}
