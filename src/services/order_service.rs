//! Order service - orders and their lines.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{
    Lookup, LookupKind, Order, OrderDetails, OrderInput, OrderItem, OrderItemInput, ProductListing,
    ProductQuery,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const DUPLICATE_ITEM: &str = "This product is already in the order";
const DUPLICATE_ORDER_NUMBER: &str = "Order with this order number already exists";

/// Order service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn list_orders(&self) -> AppResult<Vec<OrderDetails>>;

    async fn get_order(&self, id: i32) -> AppResult<OrderDetails>;

    /// Delivery point options for the order form
    async fn delivery_points(&self) -> AppResult<Vec<Lookup>>;

    /// Product options for the order item form
    async fn item_products(&self) -> AppResult<Vec<ProductListing>>;

    async fn create_order(&self, input: OrderInput) -> AppResult<Order>;

    async fn update_order(&self, id: i32, input: OrderInput) -> AppResult<Order>;

    /// Delete the order and its lines; returns the removed order
    async fn delete_order(&self, id: i32) -> AppResult<Order>;

    async fn add_item(&self, order_id: i32, input: OrderItemInput) -> AppResult<OrderItem>;

    async fn remove_item(&self, order_id: i32, item_id: i32) -> AppResult<()>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn check_input(&self, input: &OrderInput) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        errors.extend_validation(input.validate());

        if let Some(point_id) = input.delivery_point_id {
            if self
                .uow
                .lookups()
                .find(LookupKind::DeliveryPoint, point_id)
                .await?
                .is_none()
            {
                errors.add("delivery_point_id", "Select a valid choice");
            }
        }

        errors.into_result()
    }
}

fn order_number_taken(err: AppError) -> AppError {
    if err.is_conflict() {
        AppError::Invalid(FieldErrors::single("order_number", DUPLICATE_ORDER_NUMBER))
    } else {
        err
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn list_orders(&self) -> AppResult<Vec<OrderDetails>> {
        self.uow.orders().list().await
    }

    async fn get_order(&self, id: i32) -> AppResult<OrderDetails> {
        self.uow.orders().find_details(id).await?.ok_or_not_found()
    }

    async fn delivery_points(&self) -> AppResult<Vec<Lookup>> {
        self.uow.lookups().list(LookupKind::DeliveryPoint).await
    }

    async fn item_products(&self) -> AppResult<Vec<ProductListing>> {
        self.uow.products().list(&ProductQuery::default()).await
    }

    async fn create_order(&self, input: OrderInput) -> AppResult<Order> {
        self.check_input(&input).await?;
        let order = self
            .uow
            .orders()
            .create(input)
            .await
            .map_err(order_number_taken)?;
        tracing::info!(order_id = order.id, order_number = order.order_number, "Order created");
        Ok(order)
    }

    async fn update_order(&self, id: i32, input: OrderInput) -> AppResult<Order> {
        self.uow.orders().find(id).await?.ok_or_not_found()?;
        self.check_input(&input).await?;
        let order = self
            .uow
            .orders()
            .update(id, input)
            .await
            .map_err(order_number_taken)?;
        tracing::info!(order_id = order.id, "Order updated");
        Ok(order)
    }

    async fn delete_order(&self, id: i32) -> AppResult<Order> {
        let order = self.uow.orders().find(id).await?.ok_or_not_found()?;
        if !self.uow.orders().delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(order_id = id, order_number = order.order_number, "Order deleted");
        Ok(order)
    }

    async fn add_item(&self, order_id: i32, input: OrderItemInput) -> AppResult<OrderItem> {
        self.uow.orders().find(order_id).await?.ok_or_not_found()?;

        let mut errors = FieldErrors::new();
        errors.extend_validation(input.validate());
        if !errors.has("product_article")
            && self
                .uow
                .products()
                .find(&input.product_article)
                .await?
                .is_none()
        {
            errors.add("product_article", "Select a valid choice");
        }
        errors.into_result()?;

        let item = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if ctx
                        .orders()
                        .has_product(order_id, &input.product_article)
                        .await?
                    {
                        return Err(AppError::Invalid(FieldErrors::single(
                            "product_article",
                            DUPLICATE_ITEM,
                        )));
                    }
                    ctx.orders().add_item(order_id, input).await
                })
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AppError::Invalid(FieldErrors::single("product_article", DUPLICATE_ITEM))
                } else {
                    e
                }
            })?;

        tracing::info!(order_id, item_id = item.id, article = %item.product_article, "Order item added");
        Ok(item)
    }

    async fn remove_item(&self, order_id: i32, item_id: i32) -> AppResult<()> {
        if !self.uow.orders().remove_item(order_id, item_id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(order_id, item_id, "Order item removed");
        Ok(())
    }
}
