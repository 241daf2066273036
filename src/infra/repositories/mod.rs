//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod account_repository;
pub(crate) mod entities;
mod lookup_repository;
mod order_repository;
mod product_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use lookup_repository::{LookupRepository, LookupStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use product_repository::{ProductRepository, ProductStore};

pub(crate) use order_repository::{insert_item, order_has_product};
pub(crate) use product_repository::{delete_product, product_in_orders};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use lookup_repository::MockLookupRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
