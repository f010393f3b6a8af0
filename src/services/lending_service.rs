//! Lending service - the borrowing lifecycle coordinator
//!
//! Sole writer of loan status and available stock. Borrow and return are
//! compound operations over two stores with no cross-store transaction:
//! consistency comes from the reserve-before-insert / flip-before-release
//! ordering plus a compensating release on partial failure.

use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;

use crate::domain::{
    CatalogStore, LendingError, LoanRecord, LoanStore, NewLoan, PatronStore,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of a return operation
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReturnOutcome {
    pub loan: LoanRecord,
    /// True when the loan was already returned and nothing changed
    pub already_returned: bool,
}

/// Holds a reserved unit until the loan record exists.
///
/// Axum drops a handler's future when the client disconnects, so the borrow
/// operation can be cancelled between the reservation and the loan insert.
/// Dropping an armed guard releases the unit from a spawned task; `disarm`
/// hands responsibility back to the caller.
struct ReservationGuard {
    catalog: Option<Arc<dyn CatalogStore>>,
    title_id: i32,
}

impl ReservationGuard {
    fn new(catalog: Arc<dyn CatalogStore>, title_id: i32) -> Self {
        Self {
            catalog: Some(catalog),
            title_id,
        }
    }

    fn disarm(mut self) {
        self.catalog = None;
    }
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        if let Some(catalog) = self.catalog.take() {
            let title_id = self.title_id;
            tokio::spawn(async move {
                match catalog.release_unit(title_id).await {
                    Ok(()) => {
                        tracing::warn!(title_id, "borrow cancelled after reservation; unit released");
                    }
                    Err(err) => {
                        tracing::error!(
                            title_id,
                            error = %err,
                            "failed to release reserved unit after cancelled borrow; \
                             stock deficit left behind, manual reconciliation required"
                        );
                    }
                }
            });
        }
    }
}

pub struct LendingService {
    catalog: Arc<dyn CatalogStore>,
    loans: Arc<dyn LoanStore>,
    patrons: Arc<dyn PatronStore>,
    loan_period_days: i64,
}

impl LendingService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        loans: Arc<dyn LoanStore>,
        patrons: Arc<dyn PatronStore>,
        loan_period_days: i64,
    ) -> Self {
        Self {
            catalog,
            loans,
            patrons,
            loan_period_days,
        }
    }

    /// Borrow one unit of a title for a patron, due today + loan period.
    pub async fn borrow(
        &self,
        patron_id: i32,
        title_id: i32,
        notes: Option<String>,
    ) -> Result<LoanRecord, LendingError> {
        self.borrow_on(patron_id, title_id, notes, Local::now().date_naive())
            .await
    }

    /// Borrow with an explicit "today", so the clock can be injected.
    ///
    /// Ordering: duplicate check, then reservation, then insert. A patron is
    /// never charged a unit for a loan that will be rejected as a duplicate,
    /// and a reserved unit without a loan record only exists for the span of
    /// the compensating release below.
    pub async fn borrow_on(
        &self,
        patron_id: i32,
        title_id: i32,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<LoanRecord, LendingError> {
        if self.patrons.find_by_id(patron_id).await?.is_none() {
            return Err(LendingError::NotFound);
        }

        if self
            .loans
            .find_active_loan(patron_id, title_id)
            .await?
            .is_some()
        {
            return Err(LendingError::DuplicateLoan);
        }

        if !self.catalog.try_reserve_unit(title_id).await? {
            return Err(LendingError::OutOfStock);
        }
        let guard = ReservationGuard::new(Arc::clone(&self.catalog), title_id);

        let due = today + Duration::days(self.loan_period_days);
        let new_loan = NewLoan {
            patron_id,
            title_id,
            borrow_date: today.format(DATE_FORMAT).to_string(),
            due_date: due.format(DATE_FORMAT).to_string(),
            notes,
        };

        let inserted = self.loans.insert(new_loan).await;
        guard.disarm();

        match inserted {
            Ok(loan) => {
                tracing::info!(loan_id = loan.id, patron_id, title_id, "loan created");
                Ok(loan)
            }
            Err(err) => {
                // The unit was reserved but no loan exists for it: release it
                // before surfacing the error. A failure here is the one path
                // that can corrupt the stock invariant, so it is logged as
                // loudly as possible instead of being swallowed.
                if let Err(release_err) = self.catalog.release_unit(title_id).await {
                    tracing::error!(
                        patron_id,
                        title_id,
                        error = %release_err,
                        "failed to release reserved unit after loan insert failure; \
                         stock deficit left behind, manual reconciliation required"
                    );
                }
                Err(err)
            }
        }
    }

    /// Record the return of a loan, crediting the unit back exactly once.
    pub async fn return_loan(&self, loan_id: i32) -> Result<ReturnOutcome, LendingError> {
        self.return_loan_on(loan_id, Local::now().date_naive()).await
    }

    /// Return with an explicit "today".
    ///
    /// The status flip precedes the stock release, so concurrent duplicate
    /// returns are resolved by the store's conditional update: only the call
    /// that performed the flip credits the unit.
    pub async fn return_loan_on(
        &self,
        loan_id: i32,
        today: NaiveDate,
    ) -> Result<ReturnOutcome, LendingError> {
        let loan = self
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or(LendingError::NotFound)?;

        if loan.status == "returned" {
            return Ok(ReturnOutcome {
                loan,
                already_returned: true,
            });
        }

        let return_date = today.format(DATE_FORMAT).to_string();
        let flipped = self.loans.mark_returned(loan_id, &return_date).await?;

        if !flipped {
            // Lost the race to a concurrent return; the winner credits the
            // stock, this call must not.
            let loan = self
                .loans
                .find_by_id(loan_id)
                .await?
                .ok_or(LendingError::NotFound)?;
            return Ok(ReturnOutcome {
                loan,
                already_returned: true,
            });
        }

        if let Err(release_err) = self.catalog.release_unit(loan.title_id).await {
            tracing::error!(
                loan_id,
                title_id = loan.title_id,
                error = %release_err,
                "loan marked returned but stock release failed; \
                 unit not credited, manual reconciliation required"
            );
            return Err(release_err);
        }

        let loan = self
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or(LendingError::NotFound)?;

        tracing::info!(loan_id, title_id = loan.title_id, "loan returned");
        Ok(ReturnOutcome {
            loan,
            already_returned: false,
        })
    }

    /// Flip every active loan past its due date to overdue. Pure
    /// maintenance: an overdue loan still holds its unit until returned.
    pub async fn refresh_overdue(&self) -> Result<u64, LendingError> {
        self.refresh_overdue_on(Local::now().date_naive()).await
    }

    /// Overdue refresh with an explicit "as of" date.
    pub async fn refresh_overdue_on(&self, as_of: NaiveDate) -> Result<u64, LendingError> {
        let as_of = as_of.format(DATE_FORMAT).to_string();
        let count = self.loans.mark_overdue_batch(&as_of).await?;

        if count > 0 {
            tracing::info!(count, "loans flipped to overdue");
        }

        Ok(count)
    }
}
