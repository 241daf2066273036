//! Shop backend - inventory and order management for a shoe shop
//!
//! Server-rendered web application with role-based access for guests,
//! clients, managers and administrators.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases
//! - **infra**: Database, repositories and media storage
//! - **api**: HTTP handlers, forms, templates and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create a staff account
//! cargo run -- user create --username admin --password secret123 --role admin --full-name "Shop Admin"
//!
//! # Add reference data
//! cargo run -- lookup add category "Women's shoes"
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Role, UserProfile};
pub use errors::{AppError, AppResult};
