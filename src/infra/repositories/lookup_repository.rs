//! Reference data repository (categories, manufacturers, suppliers,
//! delivery points).

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::entities::{category, delivery_point, manufacturer, supplier};
use crate::domain::{Lookup, LookupKind};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// All rows of a reference table, alphabetically
    async fn list(&self, kind: LookupKind) -> AppResult<Vec<Lookup>>;

    async fn find(&self, kind: LookupKind, id: i32) -> AppResult<Option<Lookup>>;

    async fn create(&self, kind: LookupKind, name: String) -> AppResult<Lookup>;

    /// Remove a row. Rows still referenced by products fail with
    /// `AppError::Protected`.
    async fn delete(&self, kind: LookupKind, id: i32) -> AppResult<()>;
}

pub struct LookupStore {
    db: DatabaseConnection,
}

impl LookupStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LookupRepository for LookupStore {
    async fn list(&self, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        let rows: Vec<Lookup> = match kind {
            LookupKind::Category => category::Entity::find()
                .order_by_asc(category::Column::Name)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Lookup::from)
                .collect(),
            LookupKind::Manufacturer => manufacturer::Entity::find()
                .order_by_asc(manufacturer::Column::Name)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Lookup::from)
                .collect(),
            LookupKind::Supplier => supplier::Entity::find()
                .order_by_asc(supplier::Column::Name)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Lookup::from)
                .collect(),
            LookupKind::DeliveryPoint => delivery_point::Entity::find()
                .order_by_asc(delivery_point::Column::Address)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Lookup::from)
                .collect(),
        };
        Ok(rows)
    }

    async fn find(&self, kind: LookupKind, id: i32) -> AppResult<Option<Lookup>> {
        let row = match kind {
            LookupKind::Category => category::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Lookup::from),
            LookupKind::Manufacturer => manufacturer::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Lookup::from),
            LookupKind::Supplier => supplier::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Lookup::from),
            LookupKind::DeliveryPoint => delivery_point::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Lookup::from),
        };
        Ok(row)
    }

    async fn create(&self, kind: LookupKind, name: String) -> AppResult<Lookup> {
        let row: Lookup = match kind {
            LookupKind::Category => category::ActiveModel {
                name: Set(name),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
            .into(),
            LookupKind::Manufacturer => manufacturer::ActiveModel {
                name: Set(name),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
            .into(),
            LookupKind::Supplier => supplier::ActiveModel {
                name: Set(name),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
            .into(),
            LookupKind::DeliveryPoint => delivery_point::ActiveModel {
                address: Set(name),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
            .into(),
        };
        Ok(row)
    }

    async fn delete(&self, kind: LookupKind, id: i32) -> AppResult<()> {
        let result = match kind {
            LookupKind::Category => category::Entity::delete_by_id(id).exec(&self.db).await,
            LookupKind::Manufacturer => manufacturer::Entity::delete_by_id(id).exec(&self.db).await,
            LookupKind::Supplier => supplier::Entity::delete_by_id(id).exec(&self.db).await,
            LookupKind::DeliveryPoint => {
                delivery_point::Entity::delete_by_id(id).exec(&self.db).await
            }
        };

        match result.map_err(AppError::from) {
            Ok(res) if res.rows_affected == 0 => Err(AppError::NotFound),
            Ok(_) => Ok(()),
            Err(AppError::Protected(_)) => Err(AppError::protected(format!(
                "{} {} is used by products and cannot be removed",
                kind.label(),
                id
            ))),
            Err(e) => Err(e),
        }
    }
}
