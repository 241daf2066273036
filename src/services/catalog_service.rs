//! Catalog service - product listing, product writes and reference data.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::config::{MAX_ADDRESS_LENGTH, MAX_LOOKUP_NAME_LENGTH};
use crate::domain::{
    CatalogLookups, Capability, Lookup, LookupKind, PhotoUpload, Product, ProductInput,
    ProductListParams, ProductListing, ProductQuery, Role,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::{MediaStore, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What the product listing page shows
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<ProductListing>,
    /// Supplier filter options, by name
    pub suppliers: Vec<Lookup>,
    /// Whether the caller's parameters were applied
    pub filters_enabled: bool,
}

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Listing as seen by `role`; parameters are ignored for roles
    /// without the filter capability.
    async fn list_products(&self, role: Role, params: &ProductListParams) -> AppResult<ProductPage>;

    /// Select box data for the product form
    async fn lookups(&self) -> AppResult<CatalogLookups>;

    async fn get_product(&self, article: &str) -> AppResult<Product>;

    async fn create_product(
        &self,
        input: ProductInput,
        photo: Option<PhotoUpload>,
    ) -> AppResult<Product>;

    /// Overwrite the product stored under `article`. Without a new photo the
    /// existing one is kept.
    async fn update_product(
        &self,
        article: &str,
        input: ProductInput,
        photo: Option<PhotoUpload>,
    ) -> AppResult<Product>;

    /// The product, or `Protected` when an order still references it
    async fn deletable_product(&self, article: &str) -> AppResult<Product>;

    /// Delete unless referenced by an order; returns the removed product
    async fn delete_product(&self, article: &str) -> AppResult<Product>;

    async fn list_lookups(&self, kind: LookupKind) -> AppResult<Vec<Lookup>>;

    async fn add_lookup(&self, kind: LookupKind, name: &str) -> AppResult<Lookup>;

    async fn remove_lookup(&self, kind: LookupKind, id: i32) -> AppResult<()>;
}

fn in_orders_message(product: &Product) -> String {
    format!(
        "Product \"{}\" is used in orders and cannot be deleted",
        product.name
    )
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
    media: MediaStore,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>, media: MediaStore) -> Self {
        Self { uow, media }
    }

    /// Field checks that need the database: reference ids and article
    /// uniqueness. `editing` is the article of the product being edited.
    async fn check_input(
        &self,
        input: &ProductInput,
        photo: Option<&PhotoUpload>,
        editing: Option<&str>,
    ) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        errors.extend_validation(input.validate());

        if let Some(photo) = photo {
            if let Err(e) = photo.validate() {
                errors.add("photo", e.to_string());
            }
        }

        let references = [
            ("supplier_id", LookupKind::Supplier, input.supplier_id),
            ("manufacturer_id", LookupKind::Manufacturer, input.manufacturer_id),
            ("category_id", LookupKind::Category, input.category_id),
        ];
        for (field, kind, id) in references {
            if self.uow.lookups().find(kind, id).await?.is_none() {
                errors.add(field, "Select a valid choice");
            }
        }

        if editing != Some(input.article.as_str())
            && !errors.has("article")
            && self.uow.products().find(&input.article).await?.is_some()
        {
            errors.add("article", "Product with this article already exists");
        }

        errors.into_result()
    }

    /// Decode, shrink and store an upload, returning its media path.
    async fn store_photo(&self, upload: PhotoUpload) -> AppResult<String> {
        let normalized = tokio::task::spawn_blocking(move || upload.normalize())
            .await
            .map_err(|e| AppError::internal(format!("Photo processing task failed: {}", e)))?
            .map_err(|e| AppError::Invalid(FieldErrors::single("photo", e.to_string())))?;
        self.media.save_photo(&normalized).await
    }

    async fn discard_photo(&self, path: Option<String>) {
        if let Some(path) = path {
            self.media.remove(&path).await;
        }
    }
}

/// A unique violation on insert/update means another request took the article.
fn article_taken(err: AppError) -> AppError {
    if err.is_conflict() {
        AppError::Invalid(FieldErrors::single(
            "article",
            "Product with this article already exists",
        ))
    } else {
        err
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_products(&self, role: Role, params: &ProductListParams) -> AppResult<ProductPage> {
        let query = ProductQuery::for_role(role, params);
        let products = self.uow.products().list(&query).await?;
        let suppliers = self.uow.lookups().list(LookupKind::Supplier).await?;

        Ok(ProductPage {
            products,
            suppliers,
            filters_enabled: role.can(Capability::FilterProducts),
        })
    }

    async fn lookups(&self) -> AppResult<CatalogLookups> {
        let lookups = self.uow.lookups();
        Ok(CatalogLookups {
            categories: lookups.list(LookupKind::Category).await?,
            manufacturers: lookups.list(LookupKind::Manufacturer).await?,
            suppliers: lookups.list(LookupKind::Supplier).await?,
        })
    }

    async fn get_product(&self, article: &str) -> AppResult<Product> {
        self.uow.products().find(article).await?.ok_or_not_found()
    }

    async fn create_product(
        &self,
        input: ProductInput,
        photo: Option<PhotoUpload>,
    ) -> AppResult<Product> {
        self.check_input(&input, photo.as_ref(), None).await?;

        let photo_path = match photo {
            Some(upload) => Some(self.store_photo(upload).await?),
            None => None,
        };

        match self.uow.products().create(input, photo_path.clone()).await {
            Ok(product) => {
                tracing::info!(article = %product.article, "Product created");
                Ok(product)
            }
            Err(e) => {
                self.discard_photo(photo_path).await;
                Err(article_taken(e))
            }
        }
    }

    async fn update_product(
        &self,
        article: &str,
        input: ProductInput,
        photo: Option<PhotoUpload>,
    ) -> AppResult<Product> {
        let existing = self.get_product(article).await?;
        self.check_input(&input, photo.as_ref(), Some(article)).await?;

        let photo_path = match photo {
            Some(upload) => Some(self.store_photo(upload).await?),
            None => None,
        };
        let replaced_photo = photo_path.is_some();

        match self.uow.products().update(article, input, photo_path.clone()).await {
            Ok(product) => {
                if replaced_photo {
                    self.discard_photo(existing.photo).await;
                }
                tracing::info!(article = %product.article, previous = %article, "Product updated");
                Ok(product)
            }
            Err(e) => {
                self.discard_photo(photo_path).await;
                Err(article_taken(e))
            }
        }
    }

    async fn deletable_product(&self, article: &str) -> AppResult<Product> {
        let product = self.get_product(article).await?;
        if self.uow.products().is_in_orders(article).await? {
            return Err(AppError::protected(in_orders_message(&product)));
        }
        Ok(product)
    }

    async fn delete_product(&self, article: &str) -> AppResult<Product> {
        let product = self.get_product(article).await?;

        let key = product.article.clone();
        let message = in_orders_message(&product);
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if ctx.products().is_in_orders(&key).await? {
                        return Err(AppError::protected(message));
                    }
                    if !ctx.products().delete(&key).await? {
                        return Err(AppError::NotFound);
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                // order item inserted between the check and the delete
                AppError::Protected(_) => AppError::protected(in_orders_message(&product)),
                other => other,
            })?;

        self.discard_photo(product.photo.clone()).await;
        tracing::info!(article = %product.article, "Product deleted");
        Ok(product)
    }

    async fn list_lookups(&self, kind: LookupKind) -> AppResult<Vec<Lookup>> {
        self.uow.lookups().list(kind).await
    }

    async fn add_lookup(&self, kind: LookupKind, name: &str) -> AppResult<Lookup> {
        let name = name.trim();
        let max_length = match kind {
            LookupKind::DeliveryPoint => MAX_ADDRESS_LENGTH,
            _ => MAX_LOOKUP_NAME_LENGTH,
        };
        if name.is_empty() || name.chars().count() as u64 > max_length {
            return Err(AppError::validation(format!(
                "{} must be 1 to {} characters",
                kind.label(),
                max_length
            )));
        }

        let lookup = self
            .uow
            .lookups()
            .create(kind, name.to_string())
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AppError::conflict(format!("{} \"{}\"", kind.label(), name))
                } else {
                    e
                }
            })?;
        tracing::info!(kind = kind.label(), id = lookup.id, "Reference row added");
        Ok(lookup)
    }

    async fn remove_lookup(&self, kind: LookupKind, id: i32) -> AppResult<()> {
        self.uow.lookups().delete(kind, id).await?;
        tracing::info!(kind = kind.label(), id, "Reference row removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        AccountRepository, LookupRepository, MockAccountRepository, MockLookupRepository,
        MockOrderRepository, MockProductRepository, OrderRepository, ProductRepository,
        TransactionContext,
    };
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    /// Repository mocks behind the unit of work; transactions are unsupported.
    struct TestUnitOfWork {
        products: Arc<MockProductRepository>,
        lookups: Arc<MockLookupRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn accounts(&self) -> Arc<dyn AccountRepository> {
            Arc::new(MockAccountRepository::new())
        }

        fn products(&self) -> Arc<dyn ProductRepository> {
            self.products.clone()
        }

        fn lookups(&self) -> Arc<dyn LookupRepository> {
            self.lookups.clone()
        }

        fn orders(&self) -> Arc<dyn OrderRepository> {
            Arc::new(MockOrderRepository::new())
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
                > + Send,
            T: Send,
        {
            Err(AppError::internal("Transactions not supported in test mock"))
        }
    }

    fn service(products: MockProductRepository, lookups: MockLookupRepository) -> CatalogManager<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            products: Arc::new(products),
            lookups: Arc::new(lookups),
        };
        CatalogManager::new(Arc::new(uow), MediaStore::new("unused-media"))
    }

    fn product(article: &str) -> Product {
        Product {
            article: article.to_string(),
            name: "Ankle boots".to_string(),
            unit: "pcs.".to_string(),
            price: Decimal::new(4990, 0),
            supplier_id: 1,
            manufacturer_id: 1,
            category_id: 1,
            discount: Decimal::ZERO,
            quantity: 6,
            description: String::new(),
            photo: None,
        }
    }

    fn input() -> ProductInput {
        ProductInput {
            article: "A100".to_string(),
            name: "Boots".to_string(),
            unit: "pcs.".to_string(),
            price: Decimal::new(1000, 0),
            supplier_id: 1,
            manufacturer_id: 2,
            category_id: 3,
            discount: Decimal::ZERO,
            quantity: 1,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_client_listing_drops_parameters() {
        let mut products = MockProductRepository::new();
        products
            .expect_list()
            .withf(|query| query.is_unfiltered() && query.sort == crate::domain::QuantitySort::Article)
            .times(1)
            .returning(|_| Ok(vec![]));
        let mut lookups = MockLookupRepository::new();
        lookups
            .expect_list()
            .with(eq(LookupKind::Supplier))
            .returning(|_| Ok(vec![]));

        let params = ProductListParams {
            search: "boots".to_string(),
            supplier: "1".to_string(),
            sort_quantity: "desc".to_string(),
        };
        let page = service(products, lookups)
            .list_products(Role::Client, &params)
            .await
            .unwrap();
        assert!(!page.filters_enabled);
    }

    #[tokio::test]
    async fn test_deletable_product_refuses_ordered_product() {
        let mut products = MockProductRepository::new();
        products
            .expect_find()
            .returning(|article| Ok(Some(product(article))));
        products.expect_is_in_orders().returning(|_| Ok(true));

        match service(products, MockLookupRepository::new())
            .deletable_product("A112T4")
            .await
        {
            Err(AppError::Protected(message)) => {
                assert_eq!(message, "Product \"Ankle boots\" is used in orders and cannot be deleted")
            }
            other => panic!("expected protected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_never_writes() {
        let mut products = MockProductRepository::new();
        products.expect_find().returning(|_| Ok(None));
        products.expect_create().times(0);
        let mut lookups = MockLookupRepository::new();
        lookups.expect_find().returning(|kind, id| {
            Ok((kind != LookupKind::Category).then(|| Lookup {
                id,
                name: "Kari".to_string(),
            }))
        });

        let Err(AppError::Invalid(errors)) = service(products, lookups).create_product(input(), None).await
        else {
            panic!("expected invalid");
        };
        assert_eq!(errors.get("category_id"), ["Select a valid choice".to_string()]);
        assert!(!errors.has("supplier_id"));
    }

    #[tokio::test]
    async fn test_add_lookup_length_limits() {
        let mut lookups = MockLookupRepository::new();
        lookups.expect_create().times(0);
        let service = service(MockProductRepository::new(), lookups);

        let too_long = "x".repeat(MAX_LOOKUP_NAME_LENGTH as usize + 1);
        assert!(matches!(
            service.add_lookup(LookupKind::Category, &too_long).await,
            Err(AppError::Validation(_))
        ));
    }
}
