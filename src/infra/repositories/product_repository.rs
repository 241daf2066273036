//! Product repository: catalog listing with search/filter/sort and CRUD.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};

use super::entities::{category, manufacturer, order_item, product, supplier};
use crate::domain::{Product, ProductInput, ProductListing, ProductQuery, QuantitySort};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Listing joined with reference names, filtered and ordered by `query`
    async fn list(&self, query: &ProductQuery) -> AppResult<Vec<ProductListing>>;

    /// Find product by article
    async fn find(&self, article: &str) -> AppResult<Option<Product>>;

    /// Insert a product; `photo` is the stored photo path, if any
    async fn create(&self, input: ProductInput, photo: Option<String>) -> AppResult<Product>;

    /// Overwrite the product stored under `article`. `photo` replaces the
    /// stored photo only when `Some`.
    async fn update(
        &self,
        article: &str,
        input: ProductInput,
        photo: Option<String>,
    ) -> AppResult<Product>;

    /// Whether any order item references the product
    async fn is_in_orders(&self, article: &str) -> AppResult<bool>;

    /// Delete product, returns false if nothing was deleted
    async fn delete(&self, article: &str) -> AppResult<bool>;
}

/// Concrete implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self, query: &ProductQuery) -> AppResult<Vec<ProductListing>> {
        list_products(&self.db, query).await
    }

    async fn find(&self, article: &str) -> AppResult<Option<Product>> {
        let model = product::Entity::find_by_id(article.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Product::from))
    }

    async fn create(&self, input: ProductInput, photo: Option<String>) -> AppResult<Product> {
        let active_model = product::ActiveModel {
            article: Set(input.article),
            name: Set(input.name),
            unit: Set(input.unit),
            price: Set(input.price),
            supplier_id: Set(input.supplier_id),
            manufacturer_id: Set(input.manufacturer_id),
            category_id: Set(input.category_id),
            discount: Set(input.discount),
            quantity: Set(input.quantity),
            description: Set(input.description),
            photo: Set(photo),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn update(
        &self,
        article: &str,
        input: ProductInput,
        photo: Option<String>,
    ) -> AppResult<Product> {
        let new_article = input.article.clone();

        // update_many so the primary key itself can change
        let mut update = product::Entity::update_many()
            .col_expr(product::Column::Article, Expr::value(input.article))
            .col_expr(product::Column::Name, Expr::value(input.name))
            .col_expr(product::Column::Unit, Expr::value(input.unit))
            .col_expr(product::Column::Price, Expr::value(input.price))
            .col_expr(product::Column::SupplierId, Expr::value(input.supplier_id))
            .col_expr(product::Column::ManufacturerId, Expr::value(input.manufacturer_id))
            .col_expr(product::Column::CategoryId, Expr::value(input.category_id))
            .col_expr(product::Column::Discount, Expr::value(input.discount))
            .col_expr(product::Column::Quantity, Expr::value(input.quantity))
            .col_expr(product::Column::Description, Expr::value(input.description));
        if let Some(photo) = photo {
            update = update.col_expr(product::Column::Photo, Expr::value(photo));
        }

        let result = update
            .filter(product::Column::Article.eq(article))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        product::Entity::find_by_id(new_article)
            .one(&self.db)
            .await?
            .map(Product::from)
            .ok_or(AppError::NotFound)
    }

    async fn is_in_orders(&self, article: &str) -> AppResult<bool> {
        product_in_orders(&self.db, article).await
    }

    async fn delete(&self, article: &str) -> AppResult<bool> {
        delete_product(&self.db, article).await
    }
}

/// Listing row: product columns plus aliased reference names
#[derive(Debug, FromQueryResult)]
struct ProductRow {
    article: String,
    name: String,
    unit: String,
    price: Decimal,
    supplier_id: i32,
    manufacturer_id: i32,
    category_id: i32,
    discount: Decimal,
    quantity: i32,
    description: String,
    photo: Option<String>,
    category_name: String,
    manufacturer_name: String,
    supplier_name: String,
}

impl From<ProductRow> for ProductListing {
    fn from(row: ProductRow) -> Self {
        let product = Product {
            article: row.article,
            name: row.name,
            unit: row.unit,
            price: row.price,
            supplier_id: row.supplier_id,
            manufacturer_id: row.manufacturer_id,
            category_id: row.category_id,
            discount: row.discount,
            quantity: row.quantity,
            description: row.description,
            photo: row.photo,
        };
        ProductListing::new(product, row.category_name, row.manufacturer_name, row.supplier_name)
    }
}

/// Escape LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `lower(column) LIKE '%term%'`
fn contains_ci(column: SimpleExpr, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'))
}

async fn list_products<C: ConnectionTrait>(
    db: &C,
    query: &ProductQuery,
) -> AppResult<Vec<ProductListing>> {
    let mut select = product::Entity::find()
        .join(JoinType::InnerJoin, product::Relation::Category.def())
        .join(JoinType::InnerJoin, product::Relation::Manufacturer.def())
        .join(JoinType::InnerJoin, product::Relation::Supplier.def())
        .column_as(category::Column::Name, "category_name")
        .column_as(manufacturer::Column::Name, "manufacturer_name")
        .column_as(supplier::Column::Name, "supplier_name");

    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let matches_any = Condition::any()
            .add(contains_ci(Expr::col((product::Entity, product::Column::Article)).into(), &pattern))
            .add(contains_ci(Expr::col((product::Entity, product::Column::Name)).into(), &pattern))
            .add(contains_ci(
                Expr::col((product::Entity, product::Column::Description)).into(),
                &pattern,
            ))
            .add(contains_ci(
                Expr::col((manufacturer::Entity, manufacturer::Column::Name)).into(),
                &pattern,
            ))
            .add(contains_ci(
                Expr::col((supplier::Entity, supplier::Column::Name)).into(),
                &pattern,
            ))
            .add(contains_ci(
                Expr::col((category::Entity, category::Column::Name)).into(),
                &pattern,
            ));
        select = select.filter(matches_any);
    }

    if let Some(supplier_id) = query.supplier_id {
        select = select.filter(product::Column::SupplierId.eq(supplier_id));
    }

    select = match query.sort {
        QuantitySort::Ascending => select
            .order_by_asc(product::Column::Quantity)
            .order_by_asc(product::Column::Article),
        QuantitySort::Descending => select
            .order_by_desc(product::Column::Quantity)
            .order_by_asc(product::Column::Article),
        QuantitySort::Article => select.order_by_asc(product::Column::Article),
    };

    let rows = select.into_model::<ProductRow>().all(db).await?;
    Ok(rows.into_iter().map(ProductListing::from).collect())
}

pub(crate) async fn product_in_orders<C: ConnectionTrait>(db: &C, article: &str) -> AppResult<bool> {
    let count = order_item::Entity::find()
        .filter(order_item::Column::ProductArticle.eq(article))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn delete_product<C: ConnectionTrait>(db: &C, article: &str) -> AppResult<bool> {
    let result = product::Entity::delete_by_id(article.to_string())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
