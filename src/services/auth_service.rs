//! Authentication service - sessions, login and profile resolution.
//!
//! Sessions are signed JWTs carried in a cookie. The role is never taken
//! from the token: every request resolves the caller's profile afresh.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, MAX_PERSON_NAME_LENGTH, MAX_USERNAME_LENGTH};
use crate::domain::{Account, Password, ProfileLookup, Role, UserProfile};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: i32,
    pub username: String,
    /// Account session version at issue time
    pub ver: i32,
    pub exp: i64,
    pub iat: i64,
}

/// Signed session issued on login
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a session
    async fn login(&self, username: &str, password: &str) -> AppResult<SessionToken>;

    /// Verify a session token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Profile of the account a session belongs to. `None` when the session
    /// is void: the account is gone or logged out since the token was issued.
    async fn resolve_profile(&self, claims: &Claims) -> AppResult<Option<ProfileLookup>>;

    /// Void every outstanding session of the account
    async fn logout(&self, claims: &Claims) -> AppResult<()>;

    /// Create an account together with its shop profile
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        full_name: &str,
    ) -> AppResult<UserProfile>;
}

fn issue_token(account: &Account, config: &Config) -> AppResult<SessionToken> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.session_ttl_hours);

    let claims = Claims {
        sub: account.id,
        username: account.username.clone(),
        ver: account.session_version,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(SessionToken { token, expires_at })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, username: &str, password: &str) -> AppResult<SessionToken> {
        let account = self.uow.accounts().find_by_username(username).await?;

        // Verify against a dummy hash for unknown usernames so response time
        // does not reveal which accounts exist.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";
        let stored = match &account {
            Some(account) => Password::from_hash(account.password_hash.clone()),
            None => Password::from_hash(dummy_hash.to_string()),
        };
        let password_valid = stored.verify(password);

        match account {
            Some(account) if password_valid => {
                tracing::info!(account_id = account.id, "User logged in");
                issue_token(&account, &self.config)
            }
            _ => {
                tracing::warn!(username, "Failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn resolve_profile(&self, claims: &Claims) -> AppResult<Option<ProfileLookup>> {
        let accounts = self.uow.accounts();
        match accounts.find_by_id(claims.sub).await? {
            Some(account) if account.session_version == claims.ver => {
                let profile = accounts.find_profile(claims.sub).await?;
                Ok(Some(ProfileLookup::from(profile)))
            }
            _ => Ok(None),
        }
    }

    async fn logout(&self, claims: &Claims) -> AppResult<()> {
        self.uow.accounts().bump_session_version(claims.sub).await?;
        tracing::info!(account_id = claims.sub, "User logged out");
        Ok(())
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        full_name: &str,
    ) -> AppResult<UserProfile> {
        let username = username.trim();
        if username.is_empty() || username.chars().count() as u64 > MAX_USERNAME_LENGTH {
            return Err(AppError::validation(format!(
                "Username must be 1 to {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        if full_name.chars().count() as u64 > MAX_PERSON_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Full name must be at most {} characters",
                MAX_PERSON_NAME_LENGTH
            )));
        }
        if self.uow.accounts().find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(format!("User {}", username)));
        }

        let password_hash = Password::new(password)?.into_string();
        let (account, profile) = self
            .uow
            .accounts()
            .create_with_profile(
                username.to_string(),
                password_hash,
                role,
                full_name.to_string(),
            )
            .await?;

        tracing::info!(account_id = account.id, role = %role, "User created");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 7,
            username: "manager".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            session_version: 3,
        }
    }

    fn config() -> Config {
        Config::new(
            "sqlite::memory:",
            "test-secret-key-that-is-long-enough!!",
            std::path::PathBuf::from("media"),
        )
    }

    #[test]
    fn test_token_round_trip() {
        let config = config();
        let session = issue_token(&account(), &config).unwrap();
        let claims = verify_token_internal(&session.token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "manager");
        assert_eq!(claims.ver, 3);
        assert_eq!(claims.exp, session.expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, config.session_ttl_hours * 3600);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = config();
        let session = issue_token(&account(), &config).unwrap();
        let mut tampered = session.token.clone();
        tampered.push('x');
        assert!(verify_token_internal(&tampered, &config).is_err());

        let other = Config::new(
            "sqlite::memory:",
            "another-secret-key-that-is-long-enough",
            std::path::PathBuf::from("media"),
        );
        assert!(verify_token_internal(&session.token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = config();
        config.session_ttl_hours = -1;
        let session = issue_token(&account(), &config).unwrap();
        assert!(verify_token_internal(&session.token, &config).is_err());
    }
}
