//! In-process adapters for every driven repository port.
//!
//! All tables live behind one `tokio::sync::RwLock`, so each conditional
//! write (self-assignment, status transitions, the admin bootstrap) runs
//! under a single write guard and cannot interleave with another. State is
//! lost on restart; the server wires these adapters when no database is
//! configured, and handler tests use them directly.

mod categories;
mod claims;
mod ratings;
mod service_requests;
mod technicians;
mod users;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{DrivenPorts, PasswordHasher};
use crate::domain::{
    Category, CategoryId, Claim, Rating, ServiceRequest, TechnicianId, TechnicianProfile,
    UserAccount, UserId,
};

/// Categories present in a fresh store, matching the SQL seed.
pub const SEED_CATEGORIES: [&str; 4] = ["General", "Installation", "Maintenance", "Repair"];

#[derive(Debug, Clone)]
struct UserRow {
    account: UserAccount,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct TechnicianRow {
    id: TechnicianId,
    user_id: UserId,
    availability_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, UserRow>,
    technicians: BTreeMap<i64, TechnicianRow>,
    categories: BTreeMap<i64, Category>,
    service_requests: BTreeMap<i64, ServiceRequest>,
    claims: BTreeMap<i64, Claim>,
    ratings: BTreeMap<i64, Rating>,
    last_id: i64,
}

impl Tables {
    /// Identifiers are unique across tables; callers only rely on them being
    /// unique within one.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users.values().any(|row| row.account.email == email)
    }

    fn profile(&self, row: &TechnicianRow) -> Option<TechnicianProfile> {
        let user = self.users.get(&row.user_id.get())?;
        Some(TechnicianProfile {
            id: row.id,
            user_id: row.user_id,
            name: user.account.name.clone(),
            email: user.account.email.clone(),
            phone: user.account.contact.phone.clone(),
            city: user.account.contact.city.clone(),
            availability_date: row.availability_date,
        })
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Empty store seeded with the default categories.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let mut tables = Tables::default();
        for name in SEED_CATEGORIES {
            let id = tables.next_id();
            tables.categories.insert(
                id,
                Category {
                    id: CategoryId::new(id),
                    name: name.to_owned(),
                },
            );
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Identifiers of the seeded categories, in insertion order.
    pub async fn category_ids(&self) -> Vec<CategoryId> {
        self.tables
            .read()
            .await
            .categories
            .values()
            .map(|category| category.id)
            .collect()
    }

    /// Wire this store behind every repository port, sharing its clock.
    pub fn driven_ports(&self, hasher: Arc<dyn PasswordHasher>) -> DrivenPorts {
        let store = Arc::new(self.clone());
        DrivenPorts {
            users: store.clone(),
            technicians: store.clone(),
            categories: store.clone(),
            service_requests: store.clone(),
            claims: store.clone(),
            ratings: store,
            hasher,
            clock: self.clock.clone(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first, ties broken by id so listings are stable.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
