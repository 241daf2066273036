//! Product domain entity, pricing and listing queries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{Capability, Role};
use crate::config::{SORT_QUANTITY_ASC, SORT_QUANTITY_DESC};

/// Product keyed by its article code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub article: String,
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub supplier_id: i32,
    pub manufacturer_id: i32,
    pub category_id: i32,
    pub discount: Decimal,
    pub quantity: i32,
    pub description: String,
    /// Path relative to the media root
    pub photo: Option<String>,
}

impl Product {
    pub fn final_price(&self) -> Decimal {
        final_price(self.price, self.discount)
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.article, self.name)
    }
}

/// Price after applying a percentage discount, rounded to cents.
///
/// Rounding is half-to-even, matching decimal arithmetic used for the stored
/// prices. A zero discount returns the price untouched.
pub fn final_price(price: Decimal, discount: Decimal) -> Decimal {
    if discount > Decimal::ZERO {
        let discount_amount = price * (discount / Decimal::ONE_HUNDRED);
        (price - discount_amount).round_dp(2)
    } else {
        price
    }
}

/// Product row joined with the names of its reference data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub category: String,
    pub manufacturer: String,
    pub supplier: String,
    pub final_price: Decimal,
}

impl ProductListing {
    pub fn new(product: Product, category: String, manufacturer: String, supplier: String) -> Self {
        let final_price = product.final_price();
        Self {
            product,
            category,
            manufacturer,
            supplier,
            final_price,
        }
    }
}

/// Stock ordering requested by the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuantitySort {
    /// Alphabetical by article
    #[default]
    Article,
    Ascending,
    Descending,
}

impl QuantitySort {
    /// Unknown values fall back to article order.
    pub fn parse(value: &str) -> Self {
        match value {
            SORT_QUANTITY_ASC => QuantitySort::Ascending,
            SORT_QUANTITY_DESC => QuantitySort::Descending,
            _ => QuantitySort::Article,
        }
    }
}

/// Raw listing parameters as they arrive in the query string
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductListParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub sort_quantity: String,
}

/// Composed listing filter. All parts combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against text fields and
    /// reference names
    pub search: Option<String>,
    pub supplier_id: Option<i32>,
    pub sort: QuantitySort,
}

impl ProductQuery {
    pub fn from_params(params: &ProductListParams) -> Self {
        let search = params.search.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_string()),
            supplier_id: params.supplier.trim().parse().ok(),
            sort: QuantitySort::parse(&params.sort_quantity),
        }
    }

    /// Roles without the filter capability always get the full,
    /// article-ordered listing regardless of the parameters.
    pub fn for_role(role: Role, params: &ProductListParams) -> Self {
        if role.can(Capability::FilterProducts) {
            Self::from_params(params)
        } else {
            Self::default()
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.is_none() && self.supplier_id.is_none()
    }
}

/// Validated product write
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 50, message = "Article is required (at most 50 characters)"))]
    pub article: String,
    #[validate(length(min = 1, max = 200, message = "Name is required (at most 200 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Unit is required (at most 20 characters)"))]
    pub unit: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub supplier_id: i32,
    pub manufacturer_id: i32,
    pub category_id: i32,
    #[validate(custom(function = "validate_discount"))]
    pub discount: Decimal,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub description: String,
}

/// decimal(10, 2), non-negative
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price").with_message("Price cannot be negative".into()));
    }
    if price.normalize().scale() > 2 || *price >= Decimal::new(100_000_000, 0) {
        return Err(ValidationError::new("price")
            .with_message("Price must have at most 8 integer and 2 decimal digits".into()));
    }
    Ok(())
}

/// decimal(5, 2) percentage
fn validate_discount(discount: &Decimal) -> Result<(), ValidationError> {
    if *discount < Decimal::ZERO || *discount > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("discount")
            .with_message("Discount must be between 0 and 100".into()));
    }
    if discount.normalize().scale() > 2 {
        return Err(ValidationError::new("discount")
            .with_message("Discount must have at most 2 decimal digits".into()));
    }
    Ok(())
}
