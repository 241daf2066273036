//! Order repository: orders, their lines and delivery addresses.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{delivery_point, order, order_item, product};
use crate::domain::{
    Order, OrderDetails, OrderInput, OrderItem, OrderItemInput, OrderItemLine,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders with address and lines, newest order date first
    async fn list(&self) -> AppResult<Vec<OrderDetails>>;

    async fn find(&self, id: i32) -> AppResult<Option<Order>>;

    async fn find_details(&self, id: i32) -> AppResult<Option<OrderDetails>>;

    async fn create(&self, input: OrderInput) -> AppResult<Order>;

    async fn update(&self, id: i32, input: OrderInput) -> AppResult<Order>;

    /// Delete order and, by cascade, its lines
    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn add_item(&self, order_id: i32, input: OrderItemInput) -> AppResult<OrderItem>;

    /// Remove a line; false when no line with that id belongs to the order
    async fn remove_item(&self, order_id: i32, item_id: i32) -> AppResult<bool>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach delivery addresses and lines to a batch of orders
    async fn with_details(&self, orders: Vec<order::Model>) -> AppResult<Vec<OrderDetails>> {
        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let point_ids: Vec<i32> = orders.iter().filter_map(|o| o.delivery_point_id).collect();

        let addresses: HashMap<i32, String> = delivery_point::Entity::find()
            .filter(delivery_point::Column::Id.is_in(point_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.address))
            .collect();

        let mut lines: HashMap<i32, Vec<OrderItemLine>> = HashMap::new();
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_item::Column::Id)
            .find_also_related(product::Entity)
            .all(&self.db)
            .await?;
        for (item, product) in items {
            let product_name = product.map(|p| p.name).unwrap_or_default();
            lines.entry(item.order_id).or_default().push(OrderItemLine {
                item: OrderItem::from(item),
                product_name,
            });
        }

        orders
            .into_iter()
            .map(|model| {
                let delivery_address = model
                    .delivery_point_id
                    .and_then(|id| addresses.get(&id).cloned());
                let items = lines.remove(&model.id).unwrap_or_default();
                let order = Order::try_from(model)?;
                Ok(OrderDetails {
                    status_label: order.status.label(),
                    order,
                    delivery_address,
                    items,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn list(&self) -> AppResult<Vec<OrderDetails>> {
        let orders = order::Entity::find()
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;
        self.with_details(orders).await
    }

    async fn find(&self, id: i32) -> AppResult<Option<Order>> {
        order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_details(&self, id: i32) -> AppResult<Option<OrderDetails>> {
        let Some(model) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.with_details(vec![model]).await?.pop())
    }

    async fn create(&self, input: OrderInput) -> AppResult<Order> {
        let active_model = order::ActiveModel {
            order_number: Set(input.order_number),
            order_date: Set(input.order_date),
            delivery_date: Set(input.delivery_date),
            delivery_point_id: Set(input.delivery_point_id),
            customer_name: Set(input.customer_name),
            code: Set(input.code),
            status: Set(input.status.as_str().to_string()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Order::try_from(model)
    }

    async fn update(&self, id: i32, input: OrderInput) -> AppResult<Order> {
        let existing = order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: order::ActiveModel = existing.into();
        active.order_number = Set(input.order_number);
        active.order_date = Set(input.order_date);
        active.delivery_date = Set(input.delivery_date);
        active.delivery_point_id = Set(input.delivery_point_id);
        active.customer_name = Set(input.customer_name);
        active.code = Set(input.code);
        active.status = Set(input.status.as_str().to_string());

        let model = active.update(&self.db).await?;
        Order::try_from(model)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = order::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn add_item(&self, order_id: i32, input: OrderItemInput) -> AppResult<OrderItem> {
        insert_item(&self.db, order_id, input).await
    }

    async fn remove_item(&self, order_id: i32, item_id: i32) -> AppResult<bool> {
        let result = order_item::Entity::delete_many()
            .filter(order_item::Column::Id.eq(item_id))
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

pub(crate) async fn order_has_product<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    article: &str,
) -> AppResult<bool> {
    let count = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .filter(order_item::Column::ProductArticle.eq(article))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn insert_item<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    input: OrderItemInput,
) -> AppResult<OrderItem> {
    let model = order_item::ActiveModel {
        order_id: Set(order_id),
        product_article: Set(input.product_article),
        quantity: Set(input.quantity),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(OrderItem::from(model))
}
