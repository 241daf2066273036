//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Media storage for uploaded product photos
//! - Unit of Work for transaction management

pub mod db;
pub mod media;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use media::MediaStore;
pub use repositories::{
    AccountRepository, AccountStore, LookupRepository, LookupStore, OrderRepository, OrderStore,
    ProductRepository, ProductStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxOrderRepository, TxProductRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAccountRepository, MockLookupRepository, MockOrderRepository, MockProductRepository,
};
