use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use sweep_core::config::SweepConfig;
use sweep_discord::SessionHandle;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SweepConfig,
    pub session: SessionHandle,
}

impl AppState {
    pub fn new(config: SweepConfig, session: SessionHandle) -> Self {
        Self { config, session }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::root::root_handler))
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/delete-discord-message",
            post(crate::http::delete::delete_message_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
