//! Delivery point database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Lookup;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "delivery_points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub address: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lookup {
    fn from(model: Model) -> Self {
        Lookup {
            id: model.id,
            name: model.address,
        }
    }
}
