//! Registration, login, admin bootstrap and identity resolution.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::policy;
use super::port_call::{PortCall, Reported};
use super::ports::{
    AccountCommand, BootstrapOutcome, IdentityResolver, PasswordHasher, TechnicianRepository,
    UserRepository,
};
use super::{
    Actor, Error, LoginCredentials, LoginPolicy, NewUserAccount, Role, UserAccount, UserId,
};

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing [`AccountCommand`] and [`IdentityResolver`].
#[derive(Clone)]
pub struct AccountService<R: ?Sized> {
    users: Arc<R>,
    technicians: Arc<dyn TechnicianRepository>,
    hasher: Arc<dyn PasswordHasher>,
    login_policy: LoginPolicy,
}

impl<R: ?Sized> AccountService<R> {
    pub fn new(
        users: Arc<R>,
        technicians: Arc<dyn TechnicianRepository>,
        hasher: Arc<dyn PasswordHasher>,
        login_policy: LoginPolicy,
    ) -> Self {
        Self {
            users,
            technicians,
            hasher,
            login_policy,
        }
    }
}

impl<R> AccountService<R>
where
    R: UserRepository + ?Sized,
{
    async fn insert_admin(
        &self,
        account: NewUserAccount,
        call: &PortCall,
    ) -> Result<UserAccount, Error> {
        let hash = self.hasher.hash(account.password()).reported(call)?;
        self.users
            .insert(&account.into_record(Role::Admin, hash))
            .await
            .reported(call)
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: UserRepository + ?Sized,
{
    async fn register(&self, account: NewUserAccount) -> Result<UserAccount, Error> {
        let call = PortCall::new("register_user");
        let hash = self.hasher.hash(account.password()).reported(&call)?;
        let created = self
            .users
            .insert(&account.into_record(Role::User, hash))
            .await
            .reported(&call)?;
        info!(user_id = created.id.get(), "user registered");
        Ok(created)
    }

    async fn login(
        &self,
        credentials: &LoginCredentials,
        required_role: Option<Role>,
    ) -> Result<UserAccount, Error> {
        let call = PortCall::new("login");
        let Some(stored) = self
            .users
            .find_credentials(credentials.email())
            .await
            .reported(&call)?
        else {
            return Err(invalid_credentials());
        };
        let call = call.by_user(stored.account.id);
        if !self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .reported(&call)?
        {
            return Err(invalid_credentials());
        }

        let account = stored.account;
        if let Err(denial) = self.login_policy.check(account.role, required_role) {
            warn!(
                user_id = account.id.get(),
                role = account.role.as_str(),
                "login refused by role gate"
            );
            return Err(Error::forbidden(denial.to_string())
                .with_details(json!({ "code": "role_not_permitted" })));
        }
        info!(user_id = account.id.get(), role = account.role.as_str(), "login");
        Ok(account)
    }

    async fn create_admin(
        &self,
        caller: Option<UserId>,
        account: NewUserAccount,
    ) -> Result<UserAccount, Error> {
        let caller = match caller {
            Some(user_id) => Some(self.resolve(user_id).await?),
            None => None,
        };
        let caller_id = caller.as_ref().map(Actor::user_id);
        let call = match caller_id {
            Some(id) => PortCall::new("create_admin").by_user(id),
            None => PortCall::new("create_admin"),
        };

        if self.users.admin_exists().await.reported(&call)? {
            policy::enforce(policy::create_admin(caller.as_ref(), true), caller_id)?;
            let created = self.insert_admin(account, &call).await?;
            info!(caller_id = caller_id.map(UserId::get), user_id = created.id.get(), "admin created");
            return Ok(created);
        }

        let hash = self.hasher.hash(account.password()).reported(&call)?;
        let record = account.clone().into_record(Role::Admin, hash);
        match self
            .users
            .insert_bootstrap_admin(&record)
            .await
            .reported(&call)?
        {
            BootstrapOutcome::Created(created) => {
                info!(user_id = created.id.get(), "first admin bootstrapped");
                Ok(created)
            }
            // Another bootstrap won the race; fall back to the guarded rule.
            BootstrapOutcome::AdminExists => {
                policy::enforce(policy::create_admin(caller.as_ref(), true), caller_id)?;
                let created = self.insert_admin(account, &call).await?;
                info!(caller_id = caller_id.map(UserId::get), user_id = created.id.get(), "admin created");
                Ok(created)
            }
        }
    }
}

#[async_trait]
impl<R> IdentityResolver for AccountService<R>
where
    R: UserRepository + ?Sized,
{
    async fn resolve(&self, user_id: UserId) -> Result<Actor, Error> {
        let account = self.account(user_id).await?;
        let technician_id = match account.role {
            Role::Technician => self
                .technicians
                .find_by_user(user_id)
                .await
                .reported(&PortCall::new("resolve_identity").by_user(user_id))?
                .map(|profile| profile.id),
            Role::User | Role::Admin => None,
        };
        Ok(Actor::from_parts(user_id, account.role, technician_id))
    }

    async fn account(&self, user_id: UserId) -> Result<UserAccount, Error> {
        self.users
            .find(user_id)
            .await
            .reported(&PortCall::new("load_account").by_user(user_id))?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
