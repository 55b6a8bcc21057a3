//! User accounts and the guarded first-admin insert.

use async_trait::async_trait;

use crate::domain::ports::{BootstrapOutcome, UserRepository, UserRepositoryError};
use crate::domain::{NewUserRecord, Role, StoredCredentials, UserAccount, UserId};

use super::{MemoryStore, Tables, UserRow};

impl MemoryStore {
    pub(super) fn insert_user(
        tables: &mut Tables,
        record: &NewUserRecord,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<UserAccount, UserRepositoryError> {
        if tables.email_taken(&record.email) {
            return Err(UserRepositoryError::duplicate_email(record.email.clone()));
        }
        let id = tables.next_id();
        let account = UserAccount {
            id: UserId::new(id),
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            contact: record.contact.clone(),
            created_at: now,
        };
        tables.users.insert(
            id,
            UserRow {
                account: account.clone(),
                password_hash: record.password_hash.clone(),
            },
        );
        Ok(account)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserAccount, UserRepositoryError> {
        let mut tables = self.tables.write().await;
        Self::insert_user(&mut tables, record, self.now())
    }

    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id.get()).map(|row| row.account.clone()))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|row| row.account.email == email)
            .map(|row| StoredCredentials {
                account: row.account.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn admin_exists(&self) -> Result<bool, UserRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .any(|row| row.account.role == Role::Admin))
    }

    async fn insert_bootstrap_admin(
        &self,
        record: &NewUserRecord,
    ) -> Result<BootstrapOutcome, UserRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|row| row.account.role == Role::Admin)
        {
            return Ok(BootstrapOutcome::AdminExists);
        }
        Self::insert_user(&mut tables, record, self.now()).map(BootstrapOutcome::Created)
    }
}
