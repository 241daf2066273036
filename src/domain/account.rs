//! Accounts (login identities) and their shop profiles.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Role;

/// Login identity
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    /// Sessions signed with an older version are void
    pub session_version: i32,
}

/// Shop profile attached one-to-one to an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub account_id: i32,
    pub role: Role,
    pub full_name: String,
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.role.label())
    }
}

/// Outcome of looking up the profile of an authenticated account.
///
/// Accounts without a profile exist (e.g. created outside the shop), and
/// handlers must treat them as not logged in.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    Found(UserProfile),
    Missing,
}

impl ProfileLookup {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            ProfileLookup::Found(profile) => Some(profile),
            ProfileLookup::Missing => None,
        }
    }
}

impl From<Option<UserProfile>> for ProfileLookup {
    fn from(profile: Option<UserProfile>) -> Self {
        profile.map_or(ProfileLookup::Missing, ProfileLookup::Found)
    }
}
