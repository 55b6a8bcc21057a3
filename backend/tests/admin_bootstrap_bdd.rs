//! Behaviour tests for the administrator bootstrap rule.
//!
//! The first administrator may be created by anyone; afterwards the caller
//! must be an authenticated administrator.

use std::collections::HashMap;
use std::sync::Arc;

use dispatch::domain::{
    ContactDetails, Error, LoginPolicy, NewUserAccount, Role, UserAccount,
};
use dispatch::inbound::http::state::HttpState;
use dispatch::outbound::credentials::{Argon2PasswordHasher, HashCost};
use dispatch::outbound::memory::MemoryStore;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

/// Wrapper for non-Clone types to enable storage in `Slot`.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct BootstrapWorld {
    runtime: Slot<RuntimeHandle>,
    state: Slot<HttpState>,
    accounts: Slot<HashMap<String, UserAccount>>,
    last_outcome: Slot<Result<(), Error>>,
}

fn account(email: &str) -> NewUserAccount {
    NewUserAccount::try_new("Someone", email, "correct-horse", ContactDetails::default())
        .expect("valid account")
}

impl BootstrapWorld {
    fn block_on<T>(&self, operation: impl std::future::Future<Output = T>) -> T {
        let runtime = self.runtime.get().expect("runtime");
        runtime.0.block_on(operation)
    }

    fn state(&self) -> HttpState {
        self.state.get().expect("state")
    }

    fn remember(&self, outcome: Result<UserAccount, Error>) {
        let stored = match outcome {
            Ok(account) => {
                let mut accounts = self.accounts.get().unwrap_or_default();
                accounts.insert(account.email.clone(), account);
                self.accounts.set(accounts);
                Ok(())
            }
            Err(err) => Err(err),
        };
        self.last_outcome.set(stored);
    }

    fn known(&self, email: &str) -> UserAccount {
        self.accounts
            .get()
            .and_then(|accounts| accounts.get(email).cloned())
            .unwrap_or_else(|| panic!("no account recorded for {email}"))
    }

    fn create_admin_as(&self, caller: Option<&str>, email: &str) {
        let caller = caller.map(|known| self.known(known).id);
        let state = self.state();
        let outcome = self.block_on(state.accounts.create_admin(caller, account(email)));
        self.remember(outcome);
    }
}

#[fixture]
fn world() -> BootstrapWorld {
    BootstrapWorld::default()
}

#[given("an empty account store")]
fn an_empty_account_store(world: &BootstrapWorld) {
    let runtime = Runtime::new().expect("create runtime");
    let store = MemoryStore::new();
    let state = HttpState::from_driven(
        store.driven_ports(Arc::new(
            Argon2PasswordHasher::new(HashCost::MINIMAL).expect("minimal cost is valid"),
        )),
        LoginPolicy::default(),
    );
    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
    world.state.set(state);
}

#[when("an anonymous caller creates admin {email}")]
fn anonymous_creates_admin(world: &BootstrapWorld, email: String) {
    world.create_admin_as(None, &email);
}

#[when("user {email} registers")]
fn user_registers(world: &BootstrapWorld, email: String) {
    let state = world.state();
    let outcome = world.block_on(state.accounts.register(account(&email)));
    world.remember(outcome);
}

#[when("user {caller} creates admin {email}")]
fn user_creates_admin(world: &BootstrapWorld, caller: String, email: String) {
    world.create_admin_as(Some(&caller), &email);
}

#[when("admin {caller} creates admin {email}")]
fn admin_creates_admin(world: &BootstrapWorld, caller: String, email: String) {
    world.create_admin_as(Some(&caller), &email);
}

#[then("the account {email} has role {role}")]
fn the_account_has_role(world: &BootstrapWorld, email: String, role: String) {
    let expected: Role = role.parse().expect("known role");
    assert_eq!(world.known(&email).role, expected);
}

#[then("the last attempt failed with {code}")]
fn the_last_attempt_failed_with(world: &BootstrapWorld, code: String) {
    let outcome = world.last_outcome.get().expect("an attempt was made");
    let err = outcome.expect_err("attempt should have failed");
    let actual = serde_json::to_value(err.code()).expect("serialise code");
    assert_eq!(actual, serde_json::Value::String(code), "{err}");
}

#[scenario(
    path = "tests/features/admin_bootstrap.feature",
    name = "The first administrator needs no caller"
)]
fn first_admin_needs_no_caller(world: BootstrapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/admin_bootstrap.feature",
    name = "Anonymous callers are refused once an admin exists"
)]
fn anonymous_callers_are_refused(world: BootstrapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/admin_bootstrap.feature",
    name = "Plain users cannot create administrators"
)]
fn plain_users_cannot_create_admins(world: BootstrapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/admin_bootstrap.feature",
    name = "Administrators create further administrators"
)]
fn administrators_create_admins(world: BootstrapWorld) {
    let _ = world;
}
