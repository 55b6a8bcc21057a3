//! Service requests with single-guard conditional writes.

use async_trait::async_trait;

use crate::domain::ports::{
    AssignOutcome, AssignmentGuard, ServiceRequestRepository, ServiceRequestRepositoryError,
};
use crate::domain::{
    NewServiceRequest, RequestKind, ServiceRequest, ServiceRequestFilter, ServiceRequestId,
    ServiceRequestStats, ServiceRequestStatus, TechnicianId, UserId,
};

use super::{MemoryStore, Tables, newest_first};

fn technical(tables: &Tables) -> impl Iterator<Item = &ServiceRequest> {
    tables
        .service_requests
        .values()
        .filter(|request| request.kind == RequestKind::TechnicalService)
}

fn newest(mut rows: Vec<ServiceRequest>) -> Vec<ServiceRequest> {
    newest_first(&mut rows, |request| (request.created_at, request.id.get()));
    rows
}

impl MemoryStore {
    fn check_references(
        tables: &Tables,
        request: &ServiceRequest,
    ) -> Result<(), ServiceRequestRepositoryError> {
        if !tables.categories.contains_key(&request.category_id.get()) {
            return Err(ServiceRequestRepositoryError::missing_reference(format!(
                "category {}",
                request.category_id
            )));
        }
        if let Some(claim_id) = request.claim_id {
            if !tables.claims.contains_key(&claim_id.get()) {
                return Err(ServiceRequestRepositoryError::missing_reference(format!(
                    "claim {claim_id}"
                )));
            }
        }
        if let Some(technician_id) = request.technician_id {
            if !tables.technicians.contains_key(&technician_id.get()) {
                return Err(ServiceRequestRepositoryError::missing_reference(format!(
                    "technician {technician_id}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceRequestRepository for MemoryStore {
    async fn insert(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
        let mut tables = self.tables.write().await;
        let now = self.now();
        let id = tables.next_id();
        let stored = ServiceRequest {
            id: ServiceRequestId::new(id),
            requesting_user_id: request.requesting_user_id,
            technician_id: None,
            category_id: request.category_id,
            claim_id: request.claim_id,
            kind: RequestKind::TechnicalService,
            status: ServiceRequestStatus::Pending,
            subject: request.subject.clone(),
            description: request.description.clone(),
            wanted_date_start: request.wanted_date_start,
            wanted_date_end: request.wanted_date_end,
            time_shift: request.time_shift.clone(),
            created_at: now,
            updated_at: now,
        };
        Self::check_references(&tables, &stored)?;
        tables.service_requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find(
        &self,
        id: ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .service_requests
            .get(&id.get())
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.tables.read().await;
        Ok(newest(
            technical(&tables)
                .filter(|request| request.requesting_user_id == owner)
                .cloned()
                .collect(),
        ))
    }

    async fn list(
        &self,
        filter: &ServiceRequestFilter,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.tables.read().await;
        Ok(newest(
            technical(&tables)
                .filter(|request| filter.matches(request))
                .cloned()
                .collect(),
        ))
    }

    async fn list_unassigned(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = technical(&tables)
            .filter(|request| {
                request.technician_id.is_none() && request.status == ServiceRequestStatus::Pending
            })
            .cloned()
            .collect();
        rows.sort_by_key(|request| (request.created_at, request.id.get()));
        Ok(rows)
    }

    async fn list_by_technician(
        &self,
        technician: TechnicianId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.tables.read().await;
        Ok(newest(
            technical(&tables)
                .filter(|request| request.technician_id == Some(technician))
                .cloned()
                .collect(),
        ))
    }

    async fn stats(&self) -> Result<ServiceRequestStats, ServiceRequestRepositoryError> {
        let tables = self.tables.read().await;
        let mut stats = ServiceRequestStats::default();
        for request in technical(&tables) {
            stats.total += 1;
            stats.by_status.record(request.status, 1);
            if request.technician_id.is_some() {
                stats.with_technician += 1;
            } else {
                stats.without_technician += 1;
            }
        }
        Ok(stats)
    }

    async fn assign_if_unassigned(
        &self,
        id: ServiceRequestId,
        technician: TechnicianId,
    ) -> Result<AssignOutcome, ServiceRequestRepositoryError> {
        let mut tables = self.tables.write().await;
        let now = self.now();
        let Some(request) = tables
            .service_requests
            .get_mut(&id.get())
            .filter(|request| request.kind == RequestKind::TechnicalService)
        else {
            return Ok(AssignOutcome::NotFound);
        };
        if request.technician_id.is_some() {
            return Ok(AssignOutcome::AlreadyAssigned(request.clone()));
        }
        if request.status != ServiceRequestStatus::Pending {
            return Ok(AssignOutcome::NotPending(request.clone()));
        }
        request.technician_id = Some(technician);
        request.status = ServiceRequestStatus::Assigned;
        request.updated_at = now;
        Ok(AssignOutcome::Assigned(request.clone()))
    }

    async fn transition_status(
        &self,
        id: ServiceRequestId,
        from: ServiceRequestStatus,
        to: ServiceRequestStatus,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut tables = self.tables.write().await;
        let now = self.now();
        let Some(request) = tables
            .service_requests
            .get_mut(&id.get())
            .filter(|request| request.status == from)
        else {
            return Ok(None);
        };
        request.status = to;
        if !to.requires_technician() {
            request.technician_id = None;
        }
        request.updated_at = now;
        Ok(Some(request.clone()))
    }

    async fn replace(
        &self,
        request: &ServiceRequest,
        expected: AssignmentGuard,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut tables = self.tables.write().await;
        let unchanged = tables
            .service_requests
            .get(&request.id.get())
            .is_some_and(|stored| AssignmentGuard::from(stored) == expected);
        if !unchanged {
            return Ok(None);
        }
        Self::check_references(&tables, request)?;
        let now = self.now();
        let Some(stored) = tables.service_requests.get_mut(&request.id.get()) else {
            return Ok(None);
        };
        *stored = ServiceRequest {
            requesting_user_id: stored.requesting_user_id,
            kind: stored.kind,
            created_at: stored.created_at,
            updated_at: now,
            ..request.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: ServiceRequestId) -> Result<bool, ServiceRequestRepositoryError> {
        let mut tables = self.tables.write().await;
        let removed = tables.service_requests.remove(&id.get()).is_some();
        if removed {
            // Ratings keep their row with the request link cleared.
            for rating in tables.ratings.values_mut() {
                if rating.technician_request_id == Some(id) {
                    rating.technician_request_id = None;
                }
            }
        }
        Ok(removed)
    }
}
