//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod category;
pub mod delivery_point;
pub mod manufacturer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod supplier;
pub mod user_profile;
