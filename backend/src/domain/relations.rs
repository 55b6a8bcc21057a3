//! Resolves requested relations for service requests and claims.

use std::sync::Arc;

use super::ports::{CategoryRepository, ClaimRepository, TechnicianRepository, UserRepository};
use super::{
    CategoryId, Claim, ClaimId, ClaimRelation, ClaimView, Error, IncludeSet, RequestRelation,
    ServiceRequest, ServiceRequestView, TechnicianId,
};

/// Read-through lookups used to expand include sets.
#[derive(Clone)]
pub struct RelationLoader {
    users: Arc<dyn UserRepository>,
    technicians: Arc<dyn TechnicianRepository>,
    categories: Arc<dyn CategoryRepository>,
    claims: Arc<dyn ClaimRepository>,
}

impl RelationLoader {
    pub fn new(
        users: Arc<dyn UserRepository>,
        technicians: Arc<dyn TechnicianRepository>,
        categories: Arc<dyn CategoryRepository>,
        claims: Arc<dyn ClaimRepository>,
    ) -> Self {
        Self {
            users,
            technicians,
            categories,
            claims,
        }
    }

    /// Attach each requested relation. Dangling references resolve to absent
    /// relations rather than failing the read.
    pub async fn expand_request(
        &self,
        mut view: ServiceRequestView,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<ServiceRequestView, Error> {
        if include.contains(RequestRelation::Requester) {
            view.requester = self.users.find(view.request.requesting_user_id).await?;
        }
        if include.contains(RequestRelation::Technician) {
            if let Some(technician_id) = view.request.technician_id {
                view.technician = self.technicians.find(technician_id).await?;
            }
        }
        if include.contains(RequestRelation::Category) {
            view.category = self.categories.find(view.request.category_id).await?;
        }
        if include.contains(RequestRelation::Claim) {
            if let Some(claim_id) = view.request.claim_id {
                view.claim = self.claims.find(claim_id).await?;
            }
        }
        Ok(view)
    }

    pub async fn expand_requests(
        &self,
        requests: Vec<ServiceRequest>,
        include: &IncludeSet<RequestRelation>,
    ) -> Result<Vec<ServiceRequestView>, Error> {
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(self.expand_request(request.into(), include).await?);
        }
        Ok(views)
    }

    pub async fn expand_claim(
        &self,
        mut view: ClaimView,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<ClaimView, Error> {
        if include.contains(ClaimRelation::Requester) {
            view.requester = self.users.find(view.claim.requesting_user_id).await?;
        }
        if include.contains(ClaimRelation::Category) {
            view.category = self.categories.find(view.claim.category_id).await?;
        }
        Ok(view)
    }

    pub async fn expand_claims(
        &self,
        claims: Vec<Claim>,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<Vec<ClaimView>, Error> {
        let mut views = Vec::with_capacity(claims.len());
        for claim in claims {
            views.push(self.expand_claim(claim.into(), include).await?);
        }
        Ok(views)
    }

    /// Whether a category exists; used to validate new records up front.
    pub async fn category_exists(&self, id: CategoryId) -> Result<bool, Error> {
        Ok(self.categories.find(id).await?.is_some())
    }

    pub async fn technician_exists(&self, id: TechnicianId) -> Result<bool, Error> {
        Ok(self.technicians.find(id).await?.is_some())
    }

    pub async fn claim_exists(&self, id: ClaimId) -> Result<bool, Error> {
        Ok(self.find_claim(id).await?.is_some())
    }

    pub async fn find_claim(&self, id: ClaimId) -> Result<Option<Claim>, Error> {
        Ok(self.claims.find(id).await?)
    }
}
