//! Domain layer - Core business entities and rules
//!
//! Catalog, orders, accounts and the role/capability table. Nothing here
//! touches the database or HTTP.

pub mod account;
pub mod lookup;
pub mod order;
pub mod password;
pub mod photo;
pub mod product;
pub mod role;

pub use account::{Account, ProfileLookup, UserProfile};
pub use lookup::{CatalogLookups, Lookup, LookupKind};
pub use order::{Order, OrderDetails, OrderInput, OrderItem, OrderItemInput, OrderItemLine, OrderStatus};
pub use password::Password;
pub use photo::{NormalizedPhoto, PhotoError, PhotoFormat, PhotoUpload};
pub use product::{
    final_price, Product, ProductInput, ProductListParams, ProductListing, ProductQuery,
    QuantitySort,
};
pub use role::{Capability, Role};
