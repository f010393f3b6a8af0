//! SeaORM implementation of LoanStore

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use std::collections::HashMap;

use crate::domain::{
    LendingError, LoanFilter, LoanRecord, LoanStore, LoanWithDetails, NewLoan,
};
use crate::models::loan::{self, Entity as LoanEntity};
use crate::models::patron::Entity as PatronEntity;
use crate::models::title::{self, Entity as TitleEntity};

/// SeaORM-based implementation of LoanStore
pub struct SeaOrmLoanStore {
    db: DatabaseConnection,
}

impl SeaOrmLoanStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enrich loans with patron and title names (loans carry two foreign
    /// keys, so the titles come from a second query keyed by id).
    async fn with_details(
        &self,
        condition: Condition,
    ) -> Result<Vec<LoanWithDetails>, LendingError> {
        let loans_with_patrons = LoanEntity::find()
            .filter(condition)
            .order_by_desc(loan::Column::BorrowDate)
            .find_also_related(PatronEntity)
            .all(&self.db)
            .await?;

        let title_ids: Vec<i32> = loans_with_patrons.iter().map(|(l, _)| l.title_id).collect();

        let mut title_name_map: HashMap<i32, String> = HashMap::new();
        if !title_ids.is_empty() {
            let titles = TitleEntity::find()
                .filter(title::Column::Id.is_in(title_ids))
                .all(&self.db)
                .await?;

            for t in titles {
                title_name_map.insert(t.id, t.name);
            }
        }

        let result = loans_with_patrons
            .into_iter()
            .map(|(l, patron)| {
                let patron_name = patron
                    .map(|p| p.name)
                    .unwrap_or_else(|| "Unknown".to_string());
                let title_name = title_name_map
                    .get(&l.title_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());

                LoanWithDetails {
                    id: l.id,
                    patron_id: l.patron_id,
                    title_id: l.title_id,
                    borrow_date: l.borrow_date,
                    due_date: l.due_date,
                    return_date: l.return_date,
                    status: l.status,
                    notes: l.notes,
                    patron_name,
                    title_name,
                }
            })
            .collect();

        Ok(result)
    }
}

fn to_record(model: loan::Model) -> LoanRecord {
    LoanRecord {
        id: model.id,
        patron_id: model.patron_id,
        title_id: model.title_id,
        borrow_date: model.borrow_date,
        due_date: model.due_date,
        return_date: model.return_date,
        status: model.status,
        notes: model.notes,
    }
}

#[async_trait]
impl LoanStore for SeaOrmLoanStore {
    async fn insert(&self, new_loan: NewLoan) -> Result<LoanRecord, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = loan::ActiveModel {
            patron_id: Set(new_loan.patron_id),
            title_id: Set(new_loan.title_id),
            borrow_date: Set(new_loan.borrow_date),
            due_date: Set(new_loan.due_date),
            return_date: Set(None),
            status: Set("active".to_owned()),
            notes: Set(new_loan.notes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        // The unique index on open (patron, title) pairs backstops the
        // service-level duplicate check under concurrency.
        let saved = match model.insert(&self.db).await {
            Ok(saved) => saved,
            Err(err) => {
                return Err(match err.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => LendingError::DuplicateLoan,
                    _ => err.into(),
                });
            }
        };
        Ok(to_record(saved))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<LoanRecord>, LendingError> {
        let result = LoanEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(to_record))
    }

    async fn find_active_loan(
        &self,
        patron_id: i32,
        title_id: i32,
    ) -> Result<Option<LoanRecord>, LendingError> {
        let result = LoanEntity::find()
            .filter(loan::Column::PatronId.eq(patron_id))
            .filter(loan::Column::TitleId.eq(title_id))
            .filter(loan::Column::Status.is_in(["active", "overdue"]))
            .one(&self.db)
            .await?;

        Ok(result.map(to_record))
    }

    async fn mark_returned(
        &self,
        loan_id: i32,
        return_date: &str,
    ) -> Result<bool, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        // Conditional flip: of two concurrent return attempts, exactly one
        // observes rows_affected > 0 and goes on to credit the stock.
        let result = LoanEntity::update_many()
            .col_expr(loan::Column::Status, Expr::value("returned"))
            .col_expr(
                loan::Column::ReturnDate,
                Expr::value(Some(return_date.to_owned())),
            )
            .col_expr(loan::Column::UpdatedAt, Expr::value(now))
            .filter(loan::Column::Id.eq(loan_id))
            .filter(loan::Column::Status.ne("returned"))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn mark_overdue_batch(&self, as_of: &str) -> Result<u64, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = LoanEntity::update_many()
            .col_expr(loan::Column::Status, Expr::value("overdue"))
            .col_expr(loan::Column::UpdatedAt, Expr::value(now))
            .filter(loan::Column::Status.eq("active"))
            .filter(loan::Column::DueDate.lt(as_of))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn find_by_patron(
        &self,
        patron_id: i32,
    ) -> Result<Vec<LoanWithDetails>, LendingError> {
        let condition = Condition::all().add(loan::Column::PatronId.eq(patron_id));
        self.with_details(condition).await
    }

    async fn find_all(&self, filter: LoanFilter) -> Result<Vec<LoanWithDetails>, LendingError> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(loan::Column::Status.eq(status));
        }

        if let Some(patron_id) = filter.patron_id {
            condition = condition.add(loan::Column::PatronId.eq(patron_id));
        }

        self.with_details(condition).await
    }

    async fn count_by_status(&self, status: &str) -> Result<u64, LendingError> {
        let count = LoanEntity::find()
            .filter(loan::Column::Status.eq(status))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_all(&self) -> Result<u64, LendingError> {
        let count = LoanEntity::find().count(&self.db).await?;
        Ok(count)
    }
}
