//! Account repository: login identities and their shop profiles.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use super::entities::{account, user_profile};
use crate::domain::{Account, Role, UserProfile};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Find account by username (exact match)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Profile attached to the account, if any. A profile whose stored role
    /// is unknown is logged and reported as absent.
    async fn find_profile(&self, account_id: i32) -> AppResult<Option<UserProfile>>;

    /// Void every session issued so far
    async fn bump_session_version(&self, id: i32) -> AppResult<()>;

    /// Create an account without a profile
    async fn create(&self, username: String, password_hash: String) -> AppResult<Account>;

    /// Create an account and its profile atomically
    async fn create_with_profile(
        &self,
        username: String,
        password_hash: String,
        role: Role,
        full_name: String,
    ) -> AppResult<(Account, UserProfile)>;
}

/// Concrete implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let result = account::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Account::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let result = account::Entity::find()
            .filter(account::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(result.map(Account::from))
    }

    async fn find_profile(&self, account_id: i32) -> AppResult<Option<UserProfile>> {
        let result = user_profile::Entity::find()
            .filter(user_profile::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?;

        match result.map(UserProfile::try_from) {
            Some(Ok(profile)) => Ok(Some(profile)),
            Some(Err(e)) => {
                tracing::warn!(account_id, "Ignoring unusable profile: {}", e);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn bump_session_version(&self, id: i32) -> AppResult<()> {
        account::Entity::update_many()
            .col_expr(
                account::Column::SessionVersion,
                Expr::col(account::Column::SessionVersion).add(1),
            )
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<Account> {
        let active_model = account::ActiveModel {
            username: Set(username),
            password_hash: Set(password_hash),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Account::from(model))
    }

    async fn create_with_profile(
        &self,
        username: String,
        password_hash: String,
        role: Role,
        full_name: String,
    ) -> AppResult<(Account, UserProfile)> {
        let txn = self.db.begin().await?;

        let account = account::ActiveModel {
            username: Set(username),
            password_hash: Set(password_hash),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let profile = user_profile::ActiveModel {
            account_id: Set(account.id),
            role: Set(role.as_str().to_string()),
            full_name: Set(full_name),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok((Account::from(account), UserProfile::try_from(profile)?))
    }
}
