//! User profile database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Role, UserProfile};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub account_id: i32,
    pub role: String,
    pub full_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Rows with a role outside the known set are a data error, not a guest.
impl TryFrom<Model> for UserProfile {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role: Role = model.role.parse().map_err(|_| {
            AppError::internal(format!(
                "Profile {} has unknown role {:?}",
                model.id, model.role
            ))
        })?;

        Ok(UserProfile {
            id: model.id,
            account_id: model.account_id,
            role,
            full_name: model.full_name,
        })
    }
}
