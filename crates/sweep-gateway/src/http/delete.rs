//! Deletion endpoint — POST /delete-discord-message.
//!
//! Validates the request body, hands the scan to the Discord session, and
//! maps the outcome onto an HTTP status class. Every response body is a
//! JSON report with a `success` flag — gateway-layer failures never surface
//! as transport faults.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use sweep_core::types::{DeletionReport, SearchCriteria};
use sweep_discord::purge::PurgeSummary;
use sweep_discord::PurgeError;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteMessagesRequest {
    /// Discord channel to scan.
    pub channel_id: u64,
    pub product_name: String,
    pub sku: String,
    pub size: String,
    /// Messages to examine (not to delete). Defaults to `purge.default_limit`.
    pub limit: Option<u32>,
}

/// POST /delete-discord-message
pub async fn delete_message_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteMessagesRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return validation_error(format!("invalid request body: {}", rejection.body_text()));
        }
    };

    if request.channel_id == 0 {
        return validation_error("channel_id must be a positive integer");
    }
    if request.product_name.trim().is_empty() {
        return validation_error("product_name must be non-empty");
    }
    if request.sku.trim().is_empty() {
        return validation_error("sku must be non-empty");
    }
    if request.size.trim().is_empty() {
        return validation_error("size must be non-empty");
    }
    if request.limit == Some(0) {
        return validation_error("limit must be at least 1");
    }

    let purge_cfg = &state.config.purge;
    let limit = request
        .limit
        .unwrap_or(purge_cfg.default_limit)
        .min(purge_cfg.max_limit);

    let criteria = SearchCriteria {
        product_name: request.product_name,
        sku: request.sku,
        size: request.size,
    };

    let request_id = uuid::Uuid::new_v4();
    info!(
        %request_id,
        channel_id = request.channel_id,
        limit,
        product_name = %criteria.product_name,
        sku = %criteria.sku,
        size = %criteria.size,
        "processing delete request"
    );

    match state
        .session
        .search_and_delete(request.channel_id, &criteria, limit)
        .await
    {
        Ok(summary) => {
            let (status, report) = report_from_summary(summary, criteria, purge_cfg.timeout_secs);
            if report.success {
                info!(%request_id, deleted = report.deleted_count, checked = report.messages_checked, "delete request complete");
            } else {
                warn!(%request_id, error = report.error.as_deref().unwrap_or(""), "delete request incomplete");
            }
            (status, Json(report)).into_response()
        }
        Err(e) => {
            warn!(%request_id, channel_id = request.channel_id, error = %e, "delete request failed");
            let status = status_for_error(&e);
            let report = DeletionReport::failure(criteria, e.to_string());
            (status, Json(report)).into_response()
        }
    }
}

/// Turn a finished scan into a wire report plus status code.
fn report_from_summary(
    summary: PurgeSummary,
    criteria: SearchCriteria,
    timeout_secs: u64,
) -> (StatusCode, DeletionReport) {
    let (status, success, error) = if summary.timed_out {
        (
            StatusCode::GATEWAY_TIMEOUT,
            false,
            Some(format!(
                "scan exceeded {}s deadline; counts reflect partial progress",
                timeout_secs
            )),
        )
    } else if summary.all_deletes_failed {
        (
            StatusCode::BAD_GATEWAY,
            false,
            Some("every matched message failed to delete".to_string()),
        )
    } else {
        // Zero deletions is still a successful scan.
        (StatusCode::OK, true, None)
    };

    let report = DeletionReport {
        success,
        deleted_count: summary.deleted.len() as u32,
        messages_checked: summary.messages_checked,
        deleted_messages: summary.deleted,
        search_criteria: criteria,
        error,
    };
    (status, report)
}

/// 4xx for caller-correctable conditions, 5xx for platform-side ones.
fn status_for_error(e: &PurgeError) -> StatusCode {
    match e {
        PurgeError::ChannelAccess { .. } => StatusCode::NOT_FOUND,
        PurgeError::Permission { .. } => StatusCode::FORBIDDEN,
        PurgeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PurgeError::Platform(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn validation_error(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!(error = %message, "rejected delete request");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": message})),
    )
        .into_response()
}
