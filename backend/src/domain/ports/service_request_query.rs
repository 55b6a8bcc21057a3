//! Driving port for service request reads.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Actor, Error, IncludeSet, RequestRelation, ServiceRequestFilter, ServiceRequestId,
    ServiceRequestStats, ServiceRequestView,
};

/// Admin listing envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServiceRequestList {
    pub data: Vec<ServiceRequestView>,
    pub total: u64,
}

#[async_trait]
pub trait ServiceRequestQuery: Send + Sync {
    /// Requests opened by the caller.
    async fn list_own(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error>;

    async fn list_all(
        &self,
        actor: &Actor,
        filter: &ServiceRequestFilter,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<ServiceRequestList, Error>;

    async fn stats(&self, actor: &Actor) -> Result<ServiceRequestStats, Error>;

    /// Pending requests open for self-assignment.
    async fn list_unassigned(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error>;

    /// Requests assigned to the calling technician.
    async fn list_mine(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error>;

    async fn get(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<ServiceRequestView, Error>;
}
