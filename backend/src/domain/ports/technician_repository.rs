//! Port for technician profiles.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{NewUserRecord, TechnicianId, TechnicianPatch, TechnicianProfile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by technician repository adapters.
    pub enum TechnicianRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "technician repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "technician repository query failed: {message}",
        /// The account email is already registered.
        DuplicateEmail { email: String } => "email {email} is already registered",
        /// Service requests still reference the technician.
        InUse { technician_id: i64 } =>
            "technician {technician_id} is referenced by service requests",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TechnicianRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<TechnicianProfile>, TechnicianRepositoryError>;

    async fn find(
        &self,
        id: TechnicianId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError>;

    /// Profile owned by the user account, if any.
    async fn find_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError>;

    /// Create the technician user account and its profile atomically.
    async fn create(
        &self,
        account: &NewUserRecord,
        availability_date: Option<NaiveDate>,
    ) -> Result<TechnicianProfile, TechnicianRepositoryError>;

    async fn update(
        &self,
        id: TechnicianId,
        patch: &TechnicianPatch,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError>;

    /// Remove the profile and its user account atomically.
    async fn delete(&self, id: TechnicianId) -> Result<bool, TechnicianRepositoryError>;
}
