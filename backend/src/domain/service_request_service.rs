//! Service request workflow.
//!
//! Implements the command and query driving ports. Every mutation evaluates
//! its policy check before touching state; self-assignment is resolved by
//! the repository's conditional write, never by read-then-write.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::policy::{self, Action, Denial, DenialReason};
use super::port_call::{PortCall, Reported};
use super::ports::{
    AssignOutcome, AssignmentGuard, ServiceRequestCommand, ServiceRequestList, ServiceRequestQuery,
    ServiceRequestRepository,
};
use super::{
    Actor, Error, IncludeSet, NewServiceRequest, RelationLoader, RequestKind, RequestRelation,
    ServiceRequest, ServiceRequestDraft, ServiceRequestFilter, ServiceRequestId,
    ServiceRequestPatch, ServiceRequestStats, ServiceRequestStatus, ServiceRequestView,
    TechnicianId,
};

fn not_found(id: ServiceRequestId) -> Error {
    Error::not_found(format!("service request {id} not found"))
}

fn invalid_transition(from: ServiceRequestStatus, to: ServiceRequestStatus) -> Error {
    Error::invalid_transition(format!("cannot move service request from {from} to {to}"))
        .with_details(json!({ "from": from.as_str(), "to": to.as_str() }))
}

fn concurrent_update(id: ServiceRequestId) -> Error {
    Error::conflict(format!("service request {id} changed concurrently"))
        .with_details(json!({ "code": "concurrent_update" }))
}

/// Technician profile of the caller, required by technician-only listings
/// and self-assignment.
pub(crate) fn technician_profile(actor: &Actor) -> Result<TechnicianId, Error> {
    actor
        .technician_id()
        .ok_or_else(|| Error::not_found("not a registered technician"))
}

/// Service request workflow service.
#[derive(Clone)]
pub struct ServiceRequestService<R: ?Sized> {
    requests: Arc<R>,
    relations: RelationLoader,
}

impl<R: ?Sized> ServiceRequestService<R> {
    pub fn new(requests: Arc<R>, relations: RelationLoader) -> Self {
        Self {
            requests,
            relations,
        }
    }
}

impl<R> ServiceRequestService<R>
where
    R: ServiceRequestRepository + ?Sized,
{
    /// Read through to the store. Rows of another kind are reported missing.
    async fn load(&self, id: ServiceRequestId) -> Result<ServiceRequest, Error> {
        self.requests
            .find(id)
            .await?
            .filter(|request| request.kind == RequestKind::TechnicalService)
            .ok_or_else(|| not_found(id))
    }

    async fn stale_write(&self, id: ServiceRequestId, call: &PortCall) -> Error {
        match self.load(id).await {
            Ok(_) => concurrent_update(id),
            Err(error) => call.report(error),
        }
    }
}

#[async_trait]
impl<R> ServiceRequestCommand for ServiceRequestService<R>
where
    R: ServiceRequestRepository + ?Sized,
{
    async fn create(
        &self,
        actor: &Actor,
        draft: ServiceRequestDraft,
    ) -> Result<ServiceRequest, Error> {
        policy::enforce(policy::create_request(actor), Some(actor.user_id()))?;
        let new_request = NewServiceRequest::try_new(actor.user_id(), draft)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let mut call = PortCall::new("create_service_request").by(actor);

        if !self
            .relations
            .category_exists(new_request.category_id)
            .await
            .reported(&call)?
        {
            return Err(Error::invalid_field(
                "categoryId",
                format!("category {} does not exist", new_request.category_id),
            ));
        }
        if let Some(claim_id) = new_request.claim_id {
            call = call.claim(claim_id);
            let Some(claim) = self.relations.find_claim(claim_id).await.reported(&call)? else {
                return Err(Error::invalid_field(
                    "claimId",
                    format!("claim {claim_id} does not exist"),
                ));
            };
            policy::enforce(policy::link_claim(actor, &claim), Some(actor.user_id()))?;
        }

        let request = self.requests.insert(&new_request).await.reported(&call)?;
        info!(
            actor_id = actor.user_id().get(),
            request_id = request.id.get(),
            status = request.status.as_str(),
            "service request created"
        );
        Ok(request)
    }

    async fn assign_to_self(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let call = PortCall::new("assign_service_request").by(actor).request(id);
        let snapshot = self.load(id).await.reported(&call)?;
        policy::enforce(
            policy::assign_to_self(actor, &snapshot),
            Some(actor.user_id()),
        )?;
        let technician_id = technician_profile(actor)?;

        let denial = |reason| Denial {
            action: Action::AssignToSelf,
            reason,
        };
        match self
            .requests
            .assign_if_unassigned(id, technician_id)
            .await
            .reported(&call.technician(technician_id))?
        {
            AssignOutcome::Assigned(request) => {
                info!(
                    actor_id = actor.user_id().get(),
                    request_id = id.get(),
                    technician_id = technician_id.get(),
                    status = request.status.as_str(),
                    "service request self-assigned"
                );
                Ok(request)
            }
            AssignOutcome::NotFound => Err(not_found(id)),
            AssignOutcome::AlreadyAssigned(winner) => {
                warn!(
                    actor_id = actor.user_id().get(),
                    request_id = id.get(),
                    winner = winner.technician_id.map(TechnicianId::get),
                    "self-assignment lost to a concurrent claim"
                );
                Err(denial(DenialReason::AlreadyAssigned).into())
            }
            AssignOutcome::NotPending(_) => Err(denial(DenialReason::NotPending).into()),
        }
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, Error> {
        let call = PortCall::new("update_service_request_status")
            .by(actor)
            .request(id);
        let current = self.load(id).await.reported(&call)?;
        policy::enforce(
            policy::update_request_status(actor, &current),
            Some(actor.user_id()),
        )?;
        // Assignment needs a technician, which only self-assignment or a
        // full admin update can provide.
        if status == ServiceRequestStatus::Assigned || !current.status.can_transition_to(status)
        {
            return Err(invalid_transition(current.status, status));
        }

        let Some(updated) = self
            .requests
            .transition_status(id, current.status, status)
            .await
            .reported(&call)?
        else {
            return Err(self.stale_write(id, &call).await);
        };
        info!(
            actor_id = actor.user_id().get(),
            request_id = id.get(),
            from = current.status.as_str(),
            status = updated.status.as_str(),
            "service request status changed"
        );
        Ok(updated)
    }

    async fn admin_update(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        patch: ServiceRequestPatch,
    ) -> Result<ServiceRequest, Error> {
        policy::enforce(
            policy::admin_only(actor, Action::UpdateRequest),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("update_service_request").by(actor).request(id);
        let current = self.load(id).await.reported(&call)?;
        let next = patch
            .apply_to(&current)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;

        if next.category_id != current.category_id
            && !self
                .relations
                .category_exists(next.category_id)
                .await
                .reported(&call)?
        {
            return Err(Error::invalid_field(
                "categoryId",
                format!("category {} does not exist", next.category_id),
            ));
        }
        if let Some(technician_id) = next.technician_id {
            if next.technician_id != current.technician_id
                && !self
                    .relations
                    .technician_exists(technician_id)
                    .await
                    .reported(&call)?
            {
                return Err(Error::invalid_field(
                    "technicianId",
                    format!("technician {technician_id} does not exist"),
                ));
            }
        }
        if let Some(claim_id) = next.claim_id {
            if next.claim_id != current.claim_id
                && !self
                    .relations
                    .claim_exists(claim_id)
                    .await
                    .reported(&call)?
            {
                return Err(Error::invalid_field(
                    "claimId",
                    format!("claim {claim_id} does not exist"),
                ));
            }
        }

        let Some(updated) = self
            .requests
            .replace(&next, AssignmentGuard::from(&current))
            .await
            .reported(&call)?
        else {
            return Err(self.stale_write(id, &call).await);
        };
        info!(
            actor_id = actor.user_id().get(),
            request_id = id.get(),
            status = updated.status.as_str(),
            technician_id = updated.technician_id.map(TechnicianId::get),
            "service request updated by admin"
        );
        Ok(updated)
    }

    async fn delete(&self, actor: &Actor, id: ServiceRequestId) -> Result<(), Error> {
        policy::enforce(
            policy::admin_only(actor, Action::DeleteRequest),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("delete_service_request").by(actor).request(id);
        self.load(id).await.reported(&call)?;
        if !self.requests.delete(id).await.reported(&call)? {
            return Err(not_found(id));
        }
        info!(
            actor_id = actor.user_id().get(),
            request_id = id.get(),
            "service request deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl<R> ServiceRequestQuery for ServiceRequestService<R>
where
    R: ServiceRequestRepository + ?Sized,
{
    async fn list_own(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error> {
        let call = PortCall::new("list_own_service_requests").by(actor);
        let requests = self
            .requests
            .list_by_owner(actor.user_id())
            .await
            .reported(&call)?;
        self.relations
            .expand_requests(requests, include)
            .await
            .reported(&call)
    }

    async fn list_all(
        &self,
        actor: &Actor,
        filter: &ServiceRequestFilter,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<ServiceRequestList, Error> {
        policy::enforce(policy::view_any_requests(actor), Some(actor.user_id()))?;
        let call = PortCall::new("list_service_requests").by(actor);
        let requests = self.requests.list(filter).await.reported(&call)?;
        let total = u64::try_from(requests.len()).unwrap_or(u64::MAX);
        let data = self
            .relations
            .expand_requests(requests, include)
            .await
            .reported(&call)?;
        Ok(ServiceRequestList { data, total })
    }

    async fn stats(&self, actor: &Actor) -> Result<ServiceRequestStats, Error> {
        policy::enforce(policy::view_any_requests(actor), Some(actor.user_id()))?;
        self.requests
            .stats()
            .await
            .reported(&PortCall::new("service_request_stats").by(actor))
    }

    async fn list_unassigned(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error> {
        policy::enforce(policy::technician_queue(actor), Some(actor.user_id()))?;
        technician_profile(actor)?;
        let call = PortCall::new("list_unassigned_service_requests").by(actor);
        let requests = self.requests.list_unassigned().await.reported(&call)?;
        self.relations
            .expand_requests(requests, include)
            .await
            .reported(&call)
    }

    async fn list_mine(
        &self,
        actor: &Actor,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error> {
        policy::enforce(policy::technician_queue(actor), Some(actor.user_id()))?;
        let technician_id = technician_profile(actor)?;
        let call = PortCall::new("list_assigned_service_requests")
            .by(actor)
            .technician(technician_id);
        let requests = self
            .requests
            .list_by_technician(technician_id)
            .await
            .reported(&call)?;
        self.relations
            .expand_requests(requests, include)
            .await
            .reported(&call)
    }

    async fn get(
        &self,
        actor: &Actor,
        id: ServiceRequestId,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<ServiceRequestView, Error> {
        let call = PortCall::new("get_service_request").by(actor).request(id);
        let request = self.load(id).await.reported(&call)?;
        policy::enforce(policy::view_request(actor, &request), Some(actor.user_id()))?;
        self.relations
            .expand_request(request.into(), include)
            .await
            .reported(&call)
    }
}

#[cfg(test)]
#[path = "service_request_service_tests.rs"]
mod tests;
