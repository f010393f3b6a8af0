//! Reporting service - read-only aggregates for presentation layers
//!
//! No invariant enforcement here; never used to mutate state.

use std::sync::Arc;

use crate::domain::{
    CatalogCounts, CatalogStore, LendingError, LoanFilter, LoanRecord, LoanStore,
    LoanWithDetails,
};

/// Dashboard counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardStats {
    pub titles: u64,
    pub total_stock: i64,
    pub available_stock: i64,
    pub total_loans: u64,
    pub active_loans: u64,
    pub overdue_loans: u64,
}

pub struct ReportingService {
    catalog: Arc<dyn CatalogStore>,
    loans: Arc<dyn LoanStore>,
}

impl ReportingService {
    pub fn new(catalog: Arc<dyn CatalogStore>, loans: Arc<dyn LoanStore>) -> Self {
        Self { catalog, loans }
    }

    /// Total and available stock across the catalog
    pub async fn catalog_counts(&self) -> Result<CatalogCounts, LendingError> {
        self.catalog.counts().await
    }

    /// The active/overdue loan for a (patron, title) pair, if any
    pub async fn active_loan_for(
        &self,
        patron_id: i32,
        title_id: i32,
    ) -> Result<Option<LoanRecord>, LendingError> {
        self.loans.find_active_loan(patron_id, title_id).await
    }

    /// A patron's full loan history, most recent borrow first
    pub async fn loan_history(
        &self,
        patron_id: i32,
    ) -> Result<Vec<LoanWithDetails>, LendingError> {
        self.loans.find_by_patron(patron_id).await
    }

    /// All loans, optionally filtered by status or patron
    pub async fn all_loans(
        &self,
        filter: LoanFilter,
    ) -> Result<Vec<LoanWithDetails>, LendingError> {
        self.loans.find_all(filter).await
    }

    /// Counters for the dashboard view
    pub async fn dashboard(&self) -> Result<DashboardStats, LendingError> {
        let counts = self.catalog.counts().await?;
        let total_loans = self.loans.count_all().await?;
        let active_loans = self.loans.count_by_status("active").await?;
        let overdue_loans = self.loans.count_by_status("overdue").await?;

        Ok(DashboardStats {
            titles: counts.titles,
            total_stock: counts.total_stock,
            available_stock: counts.available_stock,
            total_loans,
            active_loans,
            overdue_loans,
        })
    }
}
