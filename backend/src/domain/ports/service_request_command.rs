//! Driving port for service request mutations.

use async_trait::async_trait;

use crate::domain::{
    Actor, Error, ServiceRequest, ServiceRequestDraft, ServiceRequestId, ServiceRequestPatch,
    ServiceRequestStatus,
};

/// Use-case port for the service request workflow.
#[async_trait]
pub trait ServiceRequestCommand: Send + Sync {
    /// Open a new pending request owned by `actor`.
    async fn create(
        &self,
        actor: &Actor,
        draft: ServiceRequestDraft,
    ) -> Result<ServiceRequest, Error>;

    /// Claim an unassigned pending request for the calling technician.
    async fn assign_to_self(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
    ) -> Result<ServiceRequest, Error>;

    /// Move a request along the lifecycle graph.
    async fn update_status(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, Error>;

    /// Admin full-field update, including reassignment.
    async fn admin_update(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        patch: ServiceRequestPatch,
    ) -> Result<ServiceRequest, Error>;

    async fn delete(&self, actor: &Actor, id: ServiceRequestId) -> Result<(), Error>;
}
