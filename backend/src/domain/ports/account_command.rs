//! Driving ports for accounts, login and identity resolution.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, NewUserAccount, Role, UserAccount, UserId};

#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a plain user account.
    async fn register(&self, account: NewUserAccount) -> Result<UserAccount, Error>;

    /// Verify credentials and the login role gate.
    async fn login(
        &self,
        credentials: &LoginCredentials,
        required_role: Option<Role>,
    ) -> Result<UserAccount, Error>;

    /// Create an administrator under the bootstrap rule.
    async fn create_admin(
        &self,
        caller: Option<UserId>,
        account: NewUserAccount,
    ) -> Result<UserAccount, Error>;
}

/// Maps a session user id to the caller's role and technician profile.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, user_id: UserId) -> Result<Actor, Error>;

    async fn account(&self, user_id: UserId) -> Result<UserAccount, Error>;
}
