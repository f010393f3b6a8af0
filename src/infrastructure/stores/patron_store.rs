//! SeaORM implementation of PatronStore

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

use crate::domain::{CreatePatronInput, LendingError, PatronRecord, PatronStore};
use crate::models::patron::{self, Entity as PatronEntity};

/// SeaORM-based implementation of PatronStore
pub struct SeaOrmPatronStore {
    db: DatabaseConnection,
}

impl SeaOrmPatronStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_record(model: patron::Model) -> PatronRecord {
    PatronRecord {
        id: model.id,
        name: model.name,
        email: model.email,
    }
}

#[async_trait]
impl PatronStore for SeaOrmPatronStore {
    async fn insert(&self, input: CreatePatronInput) -> Result<PatronRecord, LendingError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_patron = patron::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_patron.insert(&self.db).await?;
        Ok(to_record(result))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<PatronRecord>, LendingError> {
        let result = PatronEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(to_record))
    }

    async fn find_all(&self) -> Result<Vec<PatronRecord>, LendingError> {
        let patrons = PatronEntity::find()
            .order_by_asc(patron::Column::Name)
            .all(&self.db)
            .await?;

        Ok(patrons.into_iter().map(to_record).collect())
    }
}
