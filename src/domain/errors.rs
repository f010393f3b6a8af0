//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level outcomes
//! and infrastructure failures. `DuplicateLoan` and `OutOfStock` are expected
//! business results, not faults; they are reported to the caller and never
//! retried automatically.

use std::fmt;

#[derive(Debug)]
pub enum LendingError {
    /// Referenced title, patron or loan does not exist
    NotFound,
    /// The patron already holds an active or overdue loan of this title
    DuplicateLoan,
    /// No available unit of the title to reserve
    OutOfStock,
    /// Underlying persistence failure
    Storage(String),
}

impl fmt::Display for LendingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LendingError::NotFound => write!(f, "Resource not found"),
            LendingError::DuplicateLoan => {
                write!(f, "Patron already has an active loan for this title")
            }
            LendingError::OutOfStock => write!(f, "No available copies of this title"),
            LendingError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for LendingError {}

// Conversion from SeaORM errors (used in the store implementations)
impl From<sea_orm::DbErr> for LendingError {
    fn from(e: sea_orm::DbErr) -> Self {
        LendingError::Storage(e.to_string())
    }
}
