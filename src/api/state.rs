//! Application state - Dependency injection container.
//!
//! Provides centralized access to the services, the database handle, the
//! compiled templates and the configuration.

use std::sync::Arc;

use crate::api::views::Views;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Use cases, behind a trait so router tests can mock them
    pub services: Arc<dyn ServiceContainer>,
    /// Database handle (health checks)
    pub database: Arc<Database>,
    pub views: Arc<Views>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the real services onto `database`.
    pub fn from_config(database: Arc<Database>, config: Config) -> AppResult<Self> {
        let services = Arc::new(Services::from_connection(database.get_connection(), &config));
        Self::new(services, database, config)
    }

    /// Build state around an already assembled service container.
    pub fn new(services: Arc<dyn ServiceContainer>, database: Arc<Database>, config: Config) -> AppResult<Self> {
        Ok(Self {
            services,
            database,
            views: Arc::new(Views::new()?),
            config: Arc::new(config),
        })
    }
}
