//! Dashboard statistics handler

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::api::error_response;
use crate::infrastructure::AppState;

/// Counters for the dashboard: catalog stock plus loan totals by status
pub async fn dashboard_stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.reporting.dashboard().await {
        Ok(stats) => Json(json!({ "stats": stats })).into_response(),
        Err(e) => error_response(e),
    }
}
