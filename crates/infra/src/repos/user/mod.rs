mod inmemory;
mod postgres;

use crate::repos::shared::repo::DeleteResult;
pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;
use practice_booking_domain::{User, ID};

/// A login session issued by the authentication provider
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: ID,
    /// Millis since epoch
    pub expires: i64,
}

/// An identity at an external provider linked to a `User`
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedAccount {
    pub provider: String,
    pub provider_account_id: String,
    pub user_id: ID,
}

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
    /// Finds the owner of an unexpired session
    async fn find_by_session(&self, token: &str, now: i64) -> Option<User>;
    async fn insert_session(&self, session: &Session) -> anyhow::Result<()>;
    async fn insert_account(&self, account: &LinkedAccount) -> anyhow::Result<()>;
    async fn delete_sessions_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult>;
    async fn delete_accounts_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
}
