//! Order database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_number: i32,
    pub order_date: DateTimeUtc,
    pub delivery_date: DateTimeUtc,
    pub delivery_point_id: Option<i32>,
    pub customer_name: String,
    pub code: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_point::Entity",
        from = "Column::DeliveryPointId",
        to = "super::delivery_point::Column::Id",
        on_delete = "SetNull"
    )]
    DeliveryPoint,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::delivery_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryPoint.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: OrderStatus = model.status.parse().map_err(|_| {
            AppError::internal(format!(
                "Order {} has unknown status {:?}",
                model.id, model.status
            ))
        })?;

        Ok(Order {
            id: model.id,
            order_number: model.order_number,
            order_date: model.order_date,
            delivery_date: model.delivery_date,
            delivery_point_id: model.delivery_point_id,
            customer_name: model.customer_name,
            code: model.code,
            status,
        })
    }
}
