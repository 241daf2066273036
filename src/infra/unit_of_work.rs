//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-step writes (such as the
//! guarded product delete) inside a single database transaction.

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use std::sync::Arc;

use super::repositories::{
    delete_product, insert_item, order_has_product, product_in_orders, AccountRepository,
    AccountStore, LookupRepository, LookupStore, OrderRepository, OrderStore, ProductRepository,
    ProductStore,
};
use crate::domain::{OrderItem, OrderItemInput};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly due to the generic transaction method; service
/// tests use a hand-written implementation holding repository mocks.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn accounts(&self) -> Arc<dyn AccountRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn lookups(&self) -> Arc<dyn LookupRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access bound to an open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn products(&self) -> TxProductRepository<'_> {
        TxProductRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    account_repo: Arc<AccountStore>,
    product_repo: Arc<ProductStore>,
    lookup_repo: Arc<LookupStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            account_repo: Arc::new(AccountStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            lookup_repo: Arc::new(LookupStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.account_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn lookups(&self) -> Arc<dyn LookupRepository> {
        self.lookup_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Product operations executed within the provided transaction.
pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProductRepository<'a> {
    pub async fn is_in_orders(&self, article: &str) -> AppResult<bool> {
        product_in_orders(self.txn, article).await
    }

    pub async fn delete(&self, article: &str) -> AppResult<bool> {
        delete_product(self.txn, article).await
    }
}

/// Order item operations executed within the provided transaction.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn has_product(&self, order_id: i32, article: &str) -> AppResult<bool> {
        order_has_product(self.txn, order_id, article).await
    }

    pub async fn add_item(&self, order_id: i32, input: OrderItemInput) -> AppResult<OrderItem> {
        insert_item(self.txn, order_id, input).await
    }
}
