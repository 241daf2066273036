//! Roles and the capability table that gates every view.

use serde::{Deserialize, Serialize};

use crate::config::{ROLE_ADMIN, ROLE_CLIENT, ROLE_GUEST, ROLE_MANAGER};
use crate::errors::{AppError, AppResult};

/// Caller role, resolved per request from the user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Client,
    Guest,
}

/// Actions a handler may ask permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewProducts,
    FilterProducts,
    ManageProducts,
    ViewOrders,
    ManageOrders,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Client, Role::Guest];

    /// Capability table. Adding a role forces a decision for every capability.
    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin => true,
            Role::Manager => matches!(capability, ViewProducts | FilterProducts | ViewOrders),
            Role::Client | Role::Guest => matches!(capability, ViewProducts),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Client => ROLE_CLIENT,
            Role::Guest => ROLE_GUEST,
        }
    }

    /// Human readable label for templates
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::Client => "Authorized client",
            Role::Guest => "Guest",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_GUEST => Ok(Role::Guest),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
