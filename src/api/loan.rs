//! Loan API handlers: the borrowing lifecycle plus read queries

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::domain::LoanFilter;
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub patron_id: i32,
    pub title_id: i32,
    pub notes: Option<String>,
}

/// Borrow one unit of a title for a patron
pub async fn borrow(
    State(state): State<AppState>,
    Json(payload): Json<BorrowRequest>,
) -> impl IntoResponse {
    match state
        .lending
        .borrow(payload.patron_id, payload.title_id, payload.notes)
        .await
    {
        Ok(loan) => (
            StatusCode::CREATED,
            Json(json!({
                "loan": loan,
                "message": "Loan created successfully"
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Record the return of a loan
pub async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.lending.return_loan(id).await {
        Ok(outcome) => Json(json!({
            "loan": outcome.loan,
            "already_returned": outcome.already_returned,
            "message": if outcome.already_returned {
                "Loan was already returned"
            } else {
                "Loan returned successfully"
            }
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Flip active loans past their due date to overdue
pub async fn refresh_overdue(State(state): State<AppState>) -> impl IntoResponse {
    match state.lending.refresh_overdue().await {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    pub status: Option<String>,
    pub patron_id: Option<i32>,
}

/// List all loans, optionally filtered by status or patron
pub async fn list_loans(
    State(state): State<AppState>,
    Query(query): Query<ListLoansQuery>,
) -> impl IntoResponse {
    let filter = LoanFilter {
        status: query.status,
        patron_id: query.patron_id,
    };

    match state.reporting.all_loans(filter).await {
        Ok(loans) => {
            let total = loans.len();
            Json(json!({ "loans": loans, "total": total })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Get a single loan by ID
pub async fn get_loan(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match state.loan_store.find_by_id(id).await {
        Ok(Some(loan)) => Json(json!({ "loan": loan })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Loan not found"})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ActiveLoanQuery {
    pub patron_id: i32,
    pub title_id: i32,
}

/// The active/overdue loan for a (patron, title) pair, if any
pub async fn active_loan(
    State(state): State<AppState>,
    Query(query): Query<ActiveLoanQuery>,
) -> impl IntoResponse {
    match state
        .reporting
        .active_loan_for(query.patron_id, query.title_id)
        .await
    {
        Ok(loan) => Json(json!({ "loan": loan })).into_response(),
        Err(e) => error_response(e),
    }
}

/// A patron's loan history, most recent borrow first
pub async fn patron_history(
    State(state): State<AppState>,
    Path(patron_id): Path<i32>,
) -> impl IntoResponse {
    match state.reporting.loan_history(patron_id).await {
        Ok(loans) => {
            let total = loans.len();
            Json(json!({ "loans": loans, "total": total })).into_response()
        }
        Err(e) => error_response(e),
    }
}
