//! HTML form payloads: raw submitted values, parsed into domain inputs.
//!
//! Forms keep what the user typed so a rejected submission re-renders
//! unchanged next to its field errors.

use std::str::FromStr;

use axum::extract::Multipart;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PRODUCT_UNIT;
use crate::domain::{Order, OrderInput, OrderItemInput, OrderStatus, PhotoUpload, Product, ProductInput};
use crate::errors::{AppError, AppResult, FieldErrors};

const REQUIRED: &str = "This field is required";
const INVALID_CHOICE: &str = "Select a valid choice";

/// Input format of `datetime-local` fields
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

fn required<'a>(errors: &mut FieldErrors, field: &str, value: &'a str) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value)
    }
}

fn parse_number<T: FromStr>(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> Option<T> {
    let value = required(errors, field, value)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

fn parse_choice(errors: &mut FieldErrors, field: &str, value: &str) -> Option<i32> {
    parse_number(errors, field, value, INVALID_CHOICE)
}

fn parse_datetime(errors: &mut FieldErrors, field: &str, value: &str) -> Option<DateTime<Utc>> {
    let value = required(errors, field, value)?;
    let parsed = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"));
    match parsed {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            errors.add(field, "Enter a valid date/time");
            None
        }
    }
}

/// Product add/edit form (multipart, may carry a photo)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductForm {
    pub article: String,
    pub name: String,
    pub unit: String,
    pub price: String,
    pub supplier_id: String,
    pub manufacturer_id: String,
    pub category_id: String,
    pub discount: String,
    pub quantity: String,
    pub description: String,
    #[serde(skip)]
    pub photo: Option<PhotoUpload>,
}

impl ProductForm {
    /// Blank form with the model defaults filled in
    pub fn blank() -> Self {
        Self {
            unit: DEFAULT_PRODUCT_UNIT.to_string(),
            discount: "0".to_string(),
            quantity: "0".to_string(),
            ..Default::default()
        }
    }

    pub fn from_product(product: &Product) -> Self {
        Self {
            article: product.article.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            price: product.price.to_string(),
            supplier_id: product.supplier_id.to_string(),
            manufacturer_id: product.manufacturer_id.to_string(),
            category_id: product.category_id.to_string(),
            discount: product.discount.normalize().to_string(),
            quantity: product.quantity.to_string(),
            description: product.description.clone(),
            photo: None,
        }
    }

    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "photo" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                // browsers send an empty part when no file was chosen
                if !filename.is_empty() {
                    form.photo = Some(PhotoUpload::new(filename, bytes.to_vec()));
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "article" => form.article = value,
                "name" => form.name = value,
                "unit" => form.unit = value,
                "price" => form.price = value,
                "supplier_id" => form.supplier_id = value,
                "manufacturer_id" => form.manufacturer_id = value,
                "category_id" => form.category_id = value,
                "discount" => form.discount = value,
                "quantity" => form.quantity = value,
                "description" => form.description = value,
                _ => {}
            }
        }

        Ok(form)
    }

    /// Type-level parsing plus the photo checks; range and length rules are
    /// checked on the input.
    pub fn to_input(&self) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(Err(e)) = self.photo.as_ref().map(PhotoUpload::validate) {
            errors.add("photo", e.to_string());
        }

        let price = parse_number::<Decimal>(&mut errors, "price", &self.price, "Enter a number");
        let discount = if self.discount.trim().is_empty() {
            Some(Decimal::ZERO)
        } else {
            parse_number::<Decimal>(&mut errors, "discount", &self.discount, "Enter a number")
        };
        let quantity = if self.quantity.trim().is_empty() {
            Some(0)
        } else {
            parse_number::<i32>(&mut errors, "quantity", &self.quantity, "Enter a whole number")
        };
        let supplier_id = parse_choice(&mut errors, "supplier_id", &self.supplier_id);
        let manufacturer_id = parse_choice(&mut errors, "manufacturer_id", &self.manufacturer_id);
        let category_id = parse_choice(&mut errors, "category_id", &self.category_id);

        match (price, discount, quantity, supplier_id, manufacturer_id, category_id) {
            (
                Some(price),
                Some(discount),
                Some(quantity),
                Some(supplier_id),
                Some(manufacturer_id),
                Some(category_id),
            ) if errors.is_empty() => Ok(ProductInput {
                article: self.article.trim().to_string(),
                name: self.name.trim().to_string(),
                unit: self.unit.trim().to_string(),
                price,
                supplier_id,
                manufacturer_id,
                category_id,
                discount,
                quantity,
                description: self.description.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Order add/edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub order_number: String,
    pub order_date: String,
    pub delivery_date: String,
    pub delivery_point_id: String,
    pub customer_name: String,
    pub code: String,
    pub status: String,
}

impl OrderForm {
    pub fn blank() -> Self {
        Self {
            order_date: Utc::now().format(DATETIME_FORMAT).to_string(),
            status: OrderStatus::default().as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn from_order(order: &Order) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            order_date: order.order_date.format(DATETIME_FORMAT).to_string(),
            delivery_date: order.delivery_date.format(DATETIME_FORMAT).to_string(),
            delivery_point_id: order
                .delivery_point_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            customer_name: order.customer_name.clone(),
            code: order.code.to_string(),
            status: order.status.as_str().to_string(),
        }
    }

    pub fn to_input(&self) -> Result<OrderInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let order_number =
            parse_number::<i32>(&mut errors, "order_number", &self.order_number, "Enter a whole number");
        let order_date = parse_datetime(&mut errors, "order_date", &self.order_date);
        let delivery_date = parse_datetime(&mut errors, "delivery_date", &self.delivery_date);
        let code = parse_number::<i32>(&mut errors, "code", &self.code, "Enter a whole number");
        let delivery_point_id = if self.delivery_point_id.trim().is_empty() {
            Some(None)
        } else {
            parse_choice(&mut errors, "delivery_point_id", &self.delivery_point_id).map(Some)
        };
        let status = match self.status.trim().parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", INVALID_CHOICE);
                None
            }
        };

        match (order_number, order_date, delivery_date, code, delivery_point_id, status) {
            (
                Some(order_number),
                Some(order_date),
                Some(delivery_date),
                Some(code),
                Some(delivery_point_id),
                Some(status),
            ) if errors.is_empty() => Ok(OrderInput {
                order_number,
                order_date,
                delivery_date,
                delivery_point_id,
                customer_name: self.customer_name.trim().to_string(),
                code,
                status,
            }),
            _ => Err(errors),
        }
    }
}

/// Line added from the order edit page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItemForm {
    pub product_article: String,
    pub quantity: String,
}

impl Default for OrderItemForm {
    fn default() -> Self {
        Self {
            product_article: String::new(),
            quantity: "1".to_string(),
        }
    }
}

impl OrderItemForm {
    pub fn to_input(&self) -> Result<OrderItemInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_article = required(&mut errors, "product_article", &self.product_article)
            .map(str::to_string);
        let quantity = parse_number::<i32>(&mut errors, "quantity", &self.quantity, "Enter a whole number");

        match (product_article, quantity) {
            (Some(product_article), Some(quantity)) => Ok(OrderItemInput {
                product_article,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PHOTO_BYTES;

    fn product_form() -> ProductForm {
        ProductForm {
            article: " A100 ".to_string(),
            name: "Boots".to_string(),
            price: "1999.99".to_string(),
            supplier_id: "1".to_string(),
            manufacturer_id: "2".to_string(),
            category_id: "3".to_string(),
            ..ProductForm::blank()
        }
    }

    #[test]
    fn test_product_form_parses() {
        let input = product_form().to_input().unwrap();
        assert_eq!(input.article, "A100");
        assert_eq!(input.unit, DEFAULT_PRODUCT_UNIT);
        assert_eq!(input.price, Decimal::new(199999, 2));
        assert_eq!(input.discount, Decimal::ZERO);
        assert_eq!((input.supplier_id, input.manufacturer_id, input.category_id), (1, 2, 3));
    }

    #[test]
    fn test_product_form_reports_each_bad_field() {
        let form = ProductForm {
            price: "cheap".to_string(),
            quantity: "1.5".to_string(),
            supplier_id: String::new(),
            ..product_form()
        };
        let errors = form.to_input().unwrap_err();
        assert_eq!(errors.get("price"), ["Enter a number".to_string()]);
        assert_eq!(errors.get("quantity"), ["Enter a whole number".to_string()]);
        assert_eq!(errors.get("supplier_id"), [REQUIRED.to_string()]);
        assert!(!errors.has("category_id"));
    }

    #[test]
    fn test_photo_error_reported_with_other_field_errors() {
        let form = ProductForm {
            price: "cheap".to_string(),
            photo: Some(PhotoUpload::new("scan.bmp", vec![0; 16])),
            ..product_form()
        };
        let errors = form.to_input().unwrap_err();
        assert_eq!(errors.get("price"), ["Enter a number".to_string()]);
        assert_eq!(
            errors.get("photo"),
            ["Only JPG, PNG and GIF formats are supported".to_string()]
        );
    }

    #[test]
    fn test_bad_photo_alone_fails_parsing() {
        let form = ProductForm {
            photo: Some(PhotoUpload::new("boots.png", vec![0; MAX_PHOTO_BYTES + 1])),
            ..product_form()
        };
        let errors = form.to_input().unwrap_err();
        assert_eq!(errors.get("photo"), ["Photo size must not exceed 5MB".to_string()]);
    }

    #[test]
    fn test_order_form_parses_datetime_local() {
        let form = OrderForm {
            order_number: "1001".to_string(),
            order_date: "2024-03-01T10:30".to_string(),
            delivery_date: "2024-03-05T09:00:00".to_string(),
            delivery_point_id: String::new(),
            customer_name: "Ivan Petrov".to_string(),
            code: "555".to_string(),
            status: "completed".to_string(),
        };
        let input = form.to_input().unwrap();
        assert_eq!(input.order_date.to_rfc3339(), "2024-03-01T10:30:00+00:00");
        assert_eq!(input.delivery_point_id, None);
        assert_eq!(input.status, OrderStatus::Completed);
    }

    #[test]
    fn test_order_form_rejects_unknown_status_and_bad_date() {
        let form = OrderForm {
            status: "shipped".to_string(),
            delivery_date: "tomorrow".to_string(),
            ..OrderForm::blank()
        };
        let errors = form.to_input().unwrap_err();
        assert!(errors.has("status"));
        assert!(errors.has("delivery_date"));
        assert!(errors.has("order_number"));
    }

    #[test]
    fn test_order_item_form_defaults_quantity() {
        let form = OrderItemForm {
            product_article: "A100".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_input().unwrap().quantity, 1);
    }
}
