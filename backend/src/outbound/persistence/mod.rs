//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and the schema (`schema.rs`) stay private
//! to this module. Connections come from a `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use dispatch::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/dispatch")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_category_repository;
mod diesel_claim_repository;
mod diesel_rating_repository;
mod diesel_service_request_repository;
mod diesel_technician_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{DrivenPorts, PasswordHasher};

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_claim_repository::DieselClaimRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_service_request_repository::DieselServiceRequestRepository;
pub use diesel_technician_repository::DieselTechnicianRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every repository port to `pool`.
pub fn driven_ports(
    pool: &DbPool,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
) -> DrivenPorts {
    DrivenPorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        technicians: Arc::new(DieselTechnicianRepository::new(pool.clone())),
        categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
        service_requests: Arc::new(DieselServiceRequestRepository::new(pool.clone())),
        claims: Arc::new(DieselClaimRepository::new(pool.clone())),
        ratings: Arc::new(DieselRatingRepository::new(pool.clone())),
        hasher,
        clock,
    }
}
