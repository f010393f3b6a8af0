//! Application state containing stores, services and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{CatalogStore, LoanStore, PatronStore};
use crate::infrastructure::{SeaOrmCatalogStore, SeaOrmLoanStore, SeaOrmPatronStore};
use crate::services::{LendingService, ReportingService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog store (per-title stock counts)
    pub catalog_store: Arc<dyn CatalogStore>,
    /// Loan store (loan records and lifecycle status)
    pub loan_store: Arc<dyn LoanStore>,
    /// Patron store
    pub patron_store: Arc<dyn PatronStore>,
    /// The lending coordinator (sole writer of loan status and stock)
    pub lending: Arc<LendingService>,
    /// Read-only reporting surface
    pub reporting: Arc<ReportingService>,
}

impl AppState {
    /// Create a new AppState with stores and services wired up
    pub fn new(db: DatabaseConnection, loan_period_days: i64) -> Self {
        let catalog_store: Arc<dyn CatalogStore> = Arc::new(SeaOrmCatalogStore::new(db.clone()));
        let loan_store: Arc<dyn LoanStore> = Arc::new(SeaOrmLoanStore::new(db.clone()));
        let patron_store: Arc<dyn PatronStore> = Arc::new(SeaOrmPatronStore::new(db));

        let lending = Arc::new(LendingService::new(
            catalog_store.clone(),
            loan_store.clone(),
            patron_store.clone(),
            loan_period_days,
        ));
        let reporting = Arc::new(ReportingService::new(
            catalog_store.clone(),
            loan_store.clone(),
        ));

        Self {
            catalog_store,
            loan_store,
            patron_store,
            lending,
            reporting,
        }
    }
}
