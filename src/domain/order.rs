//! Orders and order items.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::config::{STATUS_CANCELLED, STATUS_COMPLETED, STATUS_PENDING};
use crate::errors::{AppError, AppResult};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::Completed => STATUS_COMPLETED,
            OrderStatus::Cancelled => STATUS_CANCELLED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_COMPLETED => Ok(OrderStatus::Completed),
            STATUS_CANCELLED => Ok(OrderStatus::Cancelled),
            other => Err(AppError::validation(format!("Unknown order status: {}", other))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order domain entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i32,
    pub order_number: i32,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub delivery_point_id: Option<i32>,
    pub customer_name: String,
    /// Pickup code handed to the customer
    pub code: i32,
    pub status: OrderStatus,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Order #{}", self.order_number)
    }
}

/// A product line inside an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_article: String,
    pub quantity: i32,
}

/// Order item joined with the product name for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemLine {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: String,
}

/// Order with its delivery address and lines, as listed to staff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: &'static str,
    pub delivery_address: Option<String>,
    pub items: Vec<OrderItemLine>,
}

/// Validated order write. Order number and pickup code are supplied by the
/// caller; only order number uniqueness is enforced (by the database).
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct OrderInput {
    pub order_number: i32,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub delivery_point_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Customer name is required (at most 200 characters)"))]
    pub customer_name: String,
    pub code: i32,
    pub status: OrderStatus,
}

/// Validated order item write
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_article: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        let item = OrderItemInput {
            product_article: "A1".to_string(),
            quantity: 0,
        };
        let errors = item.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }
}
