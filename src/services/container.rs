//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through `ServiceContainer`, so router
//! tests can swap the whole service layer for mocks.

use std::sync::Arc;

use super::{AuthService, CatalogService, OrderService};
use crate::config::Config;
use crate::infra::{MediaStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn orders(&self) -> Arc<dyn OrderService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    catalog_service: Arc<dyn CatalogService>,
    order_service: Arc<dyn OrderService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        catalog_service: Arc<dyn CatalogService>,
        order_service: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            auth_service,
            catalog_service,
            order_service,
        }
    }

    /// Wire every service onto one database connection
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        use super::{Authenticator, CatalogManager, OrderManager};

        let uow = Arc::new(Persistence::new(db));
        let media = MediaStore::new(config.media_root.clone());

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            catalog_service: Arc::new(CatalogManager::new(uow.clone(), media)),
            order_service: Arc::new(OrderManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }
}

/// Run independent service calls concurrently.
pub mod parallel {
    use std::future::Future;

    use crate::errors::AppResult;

    /// Await both futures; the first error wins.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        tokio::try_join!(f1, f2)
    }
}
