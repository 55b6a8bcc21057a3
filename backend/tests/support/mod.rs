//! Shared helpers for the Diesel adapter integration suites.
//!
//! Each suite under `tests/` compiles as its own crate and pulls this module
//! in with `mod support;`, so not every suite uses every helper.
#![allow(dead_code)]

pub mod cluster_skip;
pub mod embedded_postgres;

use chrono::NaiveDate;
use dispatch::domain::ports::{ServiceRequestRepository, TechnicianRepository, UserRepository};
use dispatch::domain::{
    CategoryId, ContactDetails, NewServiceRequest, NewUserRecord, Role, ServiceRequest,
    TechnicianProfile, UserAccount, UserId,
};
use dispatch::outbound::persistence::{
    DbPool, DieselServiceRequestRepository, DieselTechnicianRepository, DieselUserRepository,
    PoolConfig,
};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use tokio::runtime::Runtime;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster};

/// Category seeded by the initial migration.
pub const GENERAL: CategoryId = CategoryId::new(1);

/// Render a `postgres` error with its SQLSTATE and message.
///
/// The `Display` form often collapses database errors to `db error`, which
/// hides the part that makes a CI failure actionable.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// A migrated temporary database with a pool and a runtime to drive it.
pub struct DieselWorld {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub database_url: String,
    _database: TemporaryDatabase,
}

impl DieselWorld {
    fn setup(max_connections: u32) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = shared_cluster()?;
        let database = provision_template_database(cluster)?;
        let database_url = database.url().to_string();
        let config = PoolConfig::new(&database_url)
            .with_max_size(max_connections)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;
        Ok(Self {
            runtime,
            pool,
            database_url,
            _database: database,
        })
    }

    pub fn users(&self) -> DieselUserRepository {
        DieselUserRepository::new(self.pool.clone())
    }

    pub fn technicians(&self) -> DieselTechnicianRepository {
        DieselTechnicianRepository::new(self.pool.clone())
    }

    pub fn service_requests(&self) -> DieselServiceRequestRepository {
        DieselServiceRequestRepository::new(self.pool.clone())
    }

    pub fn customer(&self, email: &str) -> UserAccount {
        self.runtime
            .block_on(self.users().insert(&record(email, Role::User)))
            .expect("seed customer")
    }

    pub fn technician(&self, email: &str) -> TechnicianProfile {
        self.runtime
            .block_on(
                self.technicians()
                    .create(&record(email, Role::Technician), None),
            )
            .expect("seed technician")
    }

    pub fn pending_request(&self, owner: UserId) -> ServiceRequest {
        self.runtime
            .block_on(self.service_requests().insert(&new_request(owner)))
            .expect("seed service request")
    }
}

/// World with a pool wide enough for the contention tests, or `None` when
/// the cluster is unavailable and `SKIP_TEST_CLUSTER` allows skipping.
pub fn diesel_world() -> Option<DieselWorld> {
    match DieselWorld::setup(8) {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

pub fn record(email: &str, role: Role) -> NewUserRecord {
    NewUserRecord {
        name: "Diesel Test User".into(),
        email: email.into(),
        role,
        contact: ContactDetails::default(),
        password_hash: "argon2id$8$1$1$00$00".into(),
    }
}

pub fn new_request(owner: UserId) -> NewServiceRequest {
    let day = NaiveDate::from_ymd_opt(2026, 5, 4).expect("date");
    NewServiceRequest {
        requesting_user_id: owner,
        category_id: GENERAL,
        claim_id: None,
        subject: "Boiler pressure drops".into(),
        description: "Needs topping up every morning".into(),
        wanted_date_start: day,
        wanted_date_end: day,
        time_shift: "morning".into(),
    }
}
