//! Port abstraction for user account persistence.

use async_trait::async_trait;

use crate::domain::{NewUserRecord, StoredCredentials, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email is already registered.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Result of the guarded first-admin insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(UserAccount),
    /// An administrator already existed when the guard was taken.
    AdminExists,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserAccount, UserRepositoryError>;

    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Account and password digest for a lowercased email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    async fn admin_exists(&self) -> Result<bool, UserRepositoryError>;

    /// Test "no admin exists" and insert `record` as one serialized step.
    async fn insert_bootstrap_admin(
        &self,
        record: &NewUserRecord,
    ) -> Result<BootstrapOutcome, UserRepositoryError>;
}
