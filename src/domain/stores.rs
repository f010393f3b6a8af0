//! Store trait definitions
//!
//! These traits define the contract for data access. The stores are passive
//! persistence with atomic primitive operations; cross-entity decisions
//! (duplicate checks, compensating releases) belong to the lending service.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::LendingError;

/// Title data for API responses
#[derive(Debug, Clone, serde::Serialize)]
pub struct TitleRecord {
    pub id: i32,
    pub name: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub total_stock: i32,
    pub available_stock: i32,
}

/// Input for registering a title in the catalog
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateTitleInput {
    pub name: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub total_stock: i32,
}

/// Aggregate stock counts across the catalog
#[derive(Debug, Clone, serde::Serialize)]
pub struct CatalogCounts {
    pub titles: u64,
    pub total_stock: i64,
    pub available_stock: i64,
}

/// Store for per-title stock counts.
///
/// `try_reserve_unit` and `release_unit` must be single conditional atomic
/// updates on the storage engine, never read-modify-write from application
/// code: two concurrent reservations against a title with one unit left must
/// not both succeed.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Register a new title (available stock starts equal to total stock)
    async fn insert(&self, input: CreateTitleInput) -> Result<TitleRecord, LendingError>;

    /// Find a title by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<TitleRecord>, LendingError>;

    /// List all titles, ordered by name
    async fn find_all(&self) -> Result<Vec<TitleRecord>, LendingError>;

    /// Atomically decrement available stock, only if a unit is available.
    /// Returns whether the reservation succeeded; `NotFound` if the title
    /// does not exist.
    async fn try_reserve_unit(&self, title_id: i32) -> Result<bool, LendingError>;

    /// Atomically increment available stock. The lending service guarantees
    /// it never releases more units than it reserved.
    async fn release_unit(&self, title_id: i32) -> Result<(), LendingError>;

    /// Aggregate counts across the whole catalog
    async fn counts(&self) -> Result<CatalogCounts, LendingError>;
}

/// Loan data for lifecycle operations
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoanRecord {
    pub id: i32,
    pub patron_id: i32,
    pub title_id: i32,
    pub borrow_date: String,
    pub due_date: String,
    pub return_date: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

/// Loan enriched with patron and title names, for listings
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoanWithDetails {
    pub id: i32,
    pub patron_id: i32,
    pub title_id: i32,
    pub borrow_date: String,
    pub due_date: String,
    pub return_date: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub patron_name: String,
    pub title_name: String,
}

/// Input for persisting a new loan (stored in status `active`)
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub patron_id: i32,
    pub title_id: i32,
    pub borrow_date: String,
    pub due_date: String,
    pub notes: Option<String>,
}

/// Filter parameters for listing loans
#[derive(Debug, Default, Clone)]
pub struct LoanFilter {
    pub status: Option<String>,
    pub patron_id: Option<i32>,
}

/// Store for loan records and their lifecycle status.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Persist a new loan in status `active`, assigning its identity
    async fn insert(&self, loan: NewLoan) -> Result<LoanRecord, LendingError>;

    /// Find a loan by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<LoanRecord>, LendingError>;

    /// The loan in status `active` or `overdue` for this (patron, title)
    /// pair, if any. Used for the duplicate-borrow check.
    async fn find_active_loan(
        &self,
        patron_id: i32,
        title_id: i32,
    ) -> Result<Option<LoanRecord>, LendingError>;

    /// Flip a loan to `returned`, conditional on it not being returned
    /// already. Returns whether this call performed the transition; `false`
    /// means the loan was already returned and nothing changed.
    async fn mark_returned(&self, loan_id: i32, return_date: &str)
        -> Result<bool, LendingError>;

    /// Flip every `active` loan with due date strictly before `as_of` to
    /// `overdue`. Returns the number of loans affected.
    async fn mark_overdue_batch(&self, as_of: &str) -> Result<u64, LendingError>;

    /// Loans of one patron, most recent borrow first
    async fn find_by_patron(&self, patron_id: i32)
        -> Result<Vec<LoanWithDetails>, LendingError>;

    /// All loans matching the filter, most recent borrow first
    async fn find_all(&self, filter: LoanFilter) -> Result<Vec<LoanWithDetails>, LendingError>;

    /// Count loans in a given status
    async fn count_by_status(&self, status: &str) -> Result<u64, LendingError>;

    /// Count all loans
    async fn count_all(&self) -> Result<u64, LendingError>;
}

/// Patron data for API responses
#[derive(Debug, Clone, serde::Serialize)]
pub struct PatronRecord {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

/// Input for registering a patron
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreatePatronInput {
    pub name: String,
    pub email: Option<String>,
}

/// Store for patron records.
#[async_trait]
pub trait PatronStore: Send + Sync {
    /// Register a new patron
    async fn insert(&self, input: CreatePatronInput) -> Result<PatronRecord, LendingError>;

    /// Find a patron by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<PatronRecord>, LendingError>;

    /// List all patrons, ordered by name
    async fn find_all(&self) -> Result<Vec<PatronRecord>, LendingError>;
}
