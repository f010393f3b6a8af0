pub mod health;
pub mod loan;
pub mod patron;
pub mod stats;
pub mod title;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use crate::domain::LendingError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Titles
        .route("/titles", get(title::list_titles).post(title::create_title))
        .route("/titles/counts", get(title::catalog_counts))
        .route("/titles/:id", get(title::get_title))
        // Patrons
        .route(
            "/patrons",
            get(patron::list_patrons).post(patron::create_patron),
        )
        .route("/patrons/:id/loans", get(loan::patron_history))
        // Loans
        .route("/loans", get(loan::list_loans).post(loan::borrow))
        .route("/loans/active", get(loan::active_loan))
        .route("/loans/refresh-overdue", post(loan::refresh_overdue))
        .route("/loans/:id", get(loan::get_loan))
        .route("/loans/:id/return", put(loan::return_loan))
        // Dashboard
        .route("/stats", get(stats::dashboard_stats))
        .with_state(state)
}

/// Map a domain error to an HTTP response. Business-rule outcomes map to
/// 4xx statuses; only storage failures become 500s.
pub(crate) fn error_response(err: LendingError) -> Response {
    let status = match err {
        LendingError::NotFound => StatusCode::NOT_FOUND,
        LendingError::DuplicateLoan | LendingError::OutOfStock => StatusCode::CONFLICT,
        LendingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({"error": err.to_string()}))).into_response()
}
