//! Port for service request persistence.
//!
//! Adapters must implement [`ServiceRequestRepository::assign_if_unassigned`]
//! as a single conditional write so concurrent self-assignments cannot both
//! succeed.

use async_trait::async_trait;

use crate::domain::{
    NewServiceRequest, ServiceRequest, ServiceRequestFilter, ServiceRequestId,
    ServiceRequestStats, ServiceRequestStatus, TechnicianId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by service request repository adapters.
    pub enum ServiceRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "service request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "service request repository query failed: {message}",
        /// A referenced category, claim or technician does not exist.
        MissingReference { message: String } =>
            "service request references a missing record: {message}",
    }
}

/// Result of the compare-and-set self-assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The write committed; the caller now owns the request.
    Assigned(ServiceRequest),
    /// No technical-service request has this id.
    NotFound,
    /// Another technician got there first.
    AlreadyAssigned(ServiceRequest),
    /// The request is unassigned but no longer pending.
    NotPending(ServiceRequest),
}

/// Assignment state an admin update was computed from. The write only lands
/// if the stored row still carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentGuard {
    pub status: ServiceRequestStatus,
    pub technician_id: Option<TechnicianId>,
}

impl From<&ServiceRequest> for AssignmentGuard {
    fn from(request: &ServiceRequest) -> Self {
        Self {
            status: request.status,
            technician_id: request.technician_id,
        }
    }
}

/// Durable store for service requests. Only rows of kind
/// `technical_service` are returned by the listing methods.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Insert a new pending, unassigned request.
    async fn insert(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError>;

    /// Fetch a row by id regardless of kind.
    async fn find(
        &self,
        id: ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Requests opened by `owner`, newest first.
    async fn list_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Requests matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ServiceRequestFilter,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Pending requests nobody has claimed yet, oldest first.
    async fn list_unassigned(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Requests assigned to `technician`, newest first.
    async fn list_by_technician(
        &self,
        technician: TechnicianId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    async fn stats(&self) -> Result<ServiceRequestStats, ServiceRequestRepositoryError>;

    /// Set `technician_id` and `status = assigned` where the request is still
    /// unassigned and pending.
    async fn assign_if_unassigned(
        &self,
        id: ServiceRequestId,
        technician: TechnicianId,
    ) -> Result<AssignOutcome, ServiceRequestRepositoryError>;

    /// Move from `from` to `to` only if the stored status is still `from`.
    /// The technician is cleared when `to` does not carry one. Returns `None`
    /// when the row vanished or changed underneath.
    async fn transition_status(
        &self,
        id: ServiceRequestId,
        from: ServiceRequestStatus,
        to: ServiceRequestStatus,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Overwrite every mutable field with the values in `request` if the
    /// stored status and technician still match `expected`. Returns `None`
    /// when the row vanished or changed underneath.
    async fn replace(
        &self,
        request: &ServiceRequest,
        expected: AssignmentGuard,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: ServiceRequestId) -> Result<bool, ServiceRequestRepositoryError>;
}
