//! Title API handlers: catalog administration and stock counts

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::domain::CreateTitleInput;
use crate::infrastructure::AppState;

/// List all titles with their stock counts
pub async fn list_titles(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog_store.find_all().await {
        Ok(titles) => {
            let total = titles.len();
            Json(json!({ "titles": titles, "total": total })).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub total_stock: i32,
}

/// Register a new title in the catalog
pub async fn create_title(
    State(state): State<AppState>,
    Json(payload): Json<CreateTitleRequest>,
) -> impl IntoResponse {
    if payload.total_stock < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "total_stock must not be negative"})),
        )
            .into_response();
    }

    let input = CreateTitleInput {
        name: payload.name,
        author: payload.author,
        isbn: payload.isbn,
        total_stock: payload.total_stock,
    };

    match state.catalog_store.insert(input).await {
        Ok(title) => (
            StatusCode::CREATED,
            Json(json!({
                "title": title,
                "message": "Title created successfully"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Get a single title by ID
pub async fn get_title(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match state.catalog_store.find_by_id(id).await {
        Ok(Some(title)) => Json(json!({ "title": title })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Title not found"})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Aggregate stock counts across the catalog
pub async fn catalog_counts(State(state): State<AppState>) -> impl IntoResponse {
    match state.reporting.catalog_counts().await {
        Ok(counts) => Json(json!({ "counts": counts })).into_response(),
        Err(e) => error_response(e),
    }
}
