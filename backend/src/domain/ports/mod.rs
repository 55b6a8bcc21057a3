//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) are implemented by the
//! outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`IdentityResolver`], [`TechnicianDirectory`]) are implemented by the
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod category_repository;
mod claim_command;
mod claim_query;
mod claim_repository;
mod driven;
mod password_hasher;
mod rating_command;
mod rating_repository;
mod service_request_command;
mod service_request_query;
mod service_request_repository;
mod technician_directory;
mod technician_repository;
mod user_repository;

pub use account_command::{AccountCommand, IdentityResolver};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryCatalog, CategoryRepository, CategoryRepositoryError};
pub use claim_command::ClaimCommand;
pub use claim_query::ClaimQuery;
#[cfg(test)]
pub use claim_repository::MockClaimRepository;
pub use claim_repository::{ClaimRepository, ClaimRepositoryError};
pub use driven::DrivenPorts;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use rating_command::{RatingCommand, RatingQuery};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingAggregate, RatingRepository, RatingRepositoryError};
pub use service_request_command::ServiceRequestCommand;
pub use service_request_query::{ServiceRequestList, ServiceRequestQuery};
#[cfg(test)]
pub use service_request_repository::MockServiceRequestRepository;
pub use service_request_repository::{
    AssignOutcome, AssignmentGuard, ServiceRequestRepository, ServiceRequestRepositoryError,
};
pub use technician_directory::TechnicianDirectory;
#[cfg(test)]
pub use technician_repository::MockTechnicianRepository;
pub use technician_repository::{TechnicianRepository, TechnicianRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{BootstrapOutcome, UserRepository, UserRepositoryError};
