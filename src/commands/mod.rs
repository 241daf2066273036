//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod lookups;
pub mod migrate;
pub mod serve;
pub mod users;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::Services;

/// Connect, migrate and wire the services for a one-shot management command.
async fn management_services(config: &Config) -> AppResult<Services> {
    let db = Database::connect(config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    Ok(Services::from_connection(db.get_connection(), config))
}
