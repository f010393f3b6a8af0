//! SeaORM implementation of CatalogStore

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};

use crate::domain::{CatalogCounts, CatalogStore, CreateTitleInput, LendingError, TitleRecord};
use crate::models::title::{self, Entity as TitleEntity};

/// SeaORM-based implementation of CatalogStore
pub struct SeaOrmCatalogStore {
    db: DatabaseConnection,
}

impl SeaOrmCatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_record(model: title::Model) -> TitleRecord {
    TitleRecord {
        id: model.id,
        name: model.name,
        author: model.author,
        isbn: model.isbn,
        total_stock: model.total_stock,
        available_stock: model.available_stock,
    }
}

#[async_trait]
impl CatalogStore for SeaOrmCatalogStore {
    async fn insert(&self, input: CreateTitleInput) -> Result<TitleRecord, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_title = title::ActiveModel {
            name: Set(input.name),
            author: Set(input.author),
            isbn: Set(input.isbn),
            total_stock: Set(input.total_stock),
            available_stock: Set(input.total_stock),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_title.insert(&self.db).await?;
        Ok(to_record(result))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<TitleRecord>, LendingError> {
        let result = TitleEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(to_record))
    }

    async fn find_all(&self) -> Result<Vec<TitleRecord>, LendingError> {
        let titles = TitleEntity::find()
            .order_by_asc(title::Column::Name)
            .all(&self.db)
            .await?;

        Ok(titles.into_iter().map(to_record).collect())
    }

    async fn try_reserve_unit(&self, title_id: i32) -> Result<bool, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        // Single conditional UPDATE: decrement only while a unit is left.
        // Two concurrent reservations racing for the last unit resolve here,
        // in the storage engine, not in application code.
        let result = TitleEntity::update_many()
            .col_expr(
                title::Column::AvailableStock,
                Expr::col(title::Column::AvailableStock).sub(1),
            )
            .col_expr(title::Column::UpdatedAt, Expr::value(now))
            .filter(title::Column::Id.eq(title_id))
            .filter(title::Column::AvailableStock.gt(0))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            return Ok(true);
        }

        // No row changed: either the title is out of stock or it does not
        // exist. The two are different outcomes for the caller.
        let exists = TitleEntity::find_by_id(title_id).one(&self.db).await?.is_some();
        if !exists {
            return Err(LendingError::NotFound);
        }

        Ok(false)
    }

    async fn release_unit(&self, title_id: i32) -> Result<(), LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = TitleEntity::update_many()
            .col_expr(
                title::Column::AvailableStock,
                Expr::col(title::Column::AvailableStock).add(1),
            )
            .col_expr(title::Column::UpdatedAt, Expr::value(now))
            .filter(title::Column::Id.eq(title_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(LendingError::NotFound);
        }

        // The lending service never releases more than it reserved, so
        // available > total means the row was corrupted externally. Surface
        // it instead of clamping silently.
        if let Some(t) = TitleEntity::find_by_id(title_id).one(&self.db).await? {
            if t.available_stock > t.total_stock {
                tracing::error!(
                    title_id,
                    available = t.available_stock,
                    total = t.total_stock,
                    "available stock exceeds total stock; data corrupted externally"
                );
            }
        }

        Ok(())
    }

    async fn counts(&self) -> Result<CatalogCounts, LendingError> {
        let titles = TitleEntity::find().count(&self.db).await?;

        let row = self
            .db
            .query_one(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT COALESCE(SUM(total_stock), 0) AS total, \
                 COALESCE(SUM(available_stock), 0) AS available FROM titles"
                    .to_owned(),
            ))
            .await?;

        let (total_stock, available_stock) = match row {
            Some(row) => (
                row.try_get::<i64>("", "total")
                    .map_err(|e| LendingError::Storage(e.to_string()))?,
                row.try_get::<i64>("", "available")
                    .map_err(|e| LendingError::Storage(e.to_string()))?,
            ),
            None => (0, 0),
        };

        Ok(CatalogCounts {
            titles,
            total_stock,
            available_stock,
        })
    }
}
