//! Patron API handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::domain::CreatePatronInput;
use crate::infrastructure::AppState;

/// List all patrons
pub async fn list_patrons(State(state): State<AppState>) -> impl IntoResponse {
    match state.patron_store.find_all().await {
        Ok(patrons) => {
            let total = patrons.len();
            Json(json!({ "patrons": patrons, "total": total })).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePatronRequest {
    pub name: String,
    pub email: Option<String>,
}

/// Register a new patron
pub async fn create_patron(
    State(state): State<AppState>,
    Json(payload): Json<CreatePatronRequest>,
) -> impl IntoResponse {
    let input = CreatePatronInput {
        name: payload.name,
        email: payload.email,
    };

    match state.patron_store.insert(input).await {
        Ok(patron) => (
            StatusCode::CREATED,
            Json(json!({
                "patron": patron,
                "message": "Patron created successfully"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
