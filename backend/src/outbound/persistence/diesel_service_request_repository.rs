//! PostgreSQL-backed `ServiceRequestRepository`.
//!
//! Self-assignment and status transitions are single conditional `UPDATE`
//! statements; a zero-row result is re-read only to explain the miss.

use async_trait::async_trait;
use diesel::dsl::{count_star, now};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AssignOutcome, AssignmentGuard, ServiceRequestRepository, ServiceRequestRepositoryError,
};
use crate::domain::{
    NewServiceRequest, RequestKind, ServiceRequest, ServiceRequestFilter, ServiceRequestId,
    ServiceRequestStats, ServiceRequestStatus, TechnicianId, UnknownStatus, UserId,
};

use super::error_mapping::{DbFailure, contains_pattern};
use super::models::{NewServiceRequestRow, ServiceRequestRow, ServiceRequestUpdate};
use super::pool::DbPool;
use super::schema::service_requests::{self, dsl};

const TECHNICAL: &str = RequestKind::TechnicalService.as_str();

#[derive(Clone)]
pub struct DieselServiceRequestRepository {
    pool: DbPool,
}

impl DieselServiceRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_error(failure: impl Into<DbFailure>) -> ServiceRequestRepositoryError {
    match failure.into() {
        DbFailure::Connection(message) => ServiceRequestRepositoryError::connection(message),
        fk @ DbFailure::ForeignKeyViolation { .. } => {
            ServiceRequestRepositoryError::missing_reference(fk.message())
        }
        other => ServiceRequestRepositoryError::query(other.message()),
    }
}

fn decode(row: ServiceRequestRow) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
    ServiceRequest::try_from(row).map_err(to_error)
}

fn decode_all(
    rows: Vec<ServiceRequestRow>,
) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
    rows.into_iter().map(decode).collect()
}

fn technical_requests() -> service_requests::BoxedQuery<'static, diesel::pg::Pg> {
    service_requests::table
        .filter(dsl::kind.eq(TECHNICAL))
        .into_boxed()
}

fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl ServiceRequestRepository for DieselServiceRequestRepository {
    async fn insert(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row = diesel::insert_into(service_requests::table)
            .values(&NewServiceRequestRow {
                requesting_user_id: request.requesting_user_id.get(),
                category_id: request.category_id.get(),
                claim_id: request.claim_id.map(|id| id.get()),
                kind: TECHNICAL,
                status: ServiceRequestStatus::Pending.as_str(),
                subject: &request.subject,
                description: &request.description,
                wanted_date_start: request.wanted_date_start,
                wanted_date_end: request.wanted_date_end,
                time_shift: &request.time_shift,
            })
            .returning(ServiceRequestRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(to_error)?;
        decode(row)
    }

    async fn find(
        &self,
        id: ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<ServiceRequestRow> = service_requests::table
            .find(id.get())
            .select(ServiceRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows = technical_requests()
            .filter(dsl::requesting_user_id.eq(owner.get()))
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        decode_all(rows)
    }

    async fn list(
        &self,
        filter: &ServiceRequestFilter,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let mut query = technical_requests();
        if let Some(status) = filter.status {
            query = query.filter(dsl::status.eq(status.as_str()));
        }
        if let Some(technician_id) = filter.technician_id {
            query = query.filter(dsl::technician_id.eq(technician_id.get()));
        }
        if let Some(needle) = filter.needle() {
            let pattern = contains_pattern(&needle);
            query = query.filter(
                dsl::subject
                    .ilike(pattern.clone())
                    .or(dsl::description.ilike(pattern)),
            );
        }
        let rows = query
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        decode_all(rows)
    }

    async fn list_unassigned(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows = technical_requests()
            .filter(dsl::technician_id.is_null())
            .filter(dsl::status.eq(ServiceRequestStatus::Pending.as_str()))
            .order_by((dsl::created_at.asc(), dsl::id.asc()))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        decode_all(rows)
    }

    async fn list_by_technician(
        &self,
        technician: TechnicianId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows = technical_requests()
            .filter(dsl::technician_id.eq(technician.get()))
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        decode_all(rows)
    }

    async fn stats(&self) -> Result<ServiceRequestStats, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let by_status: Vec<(String, i64)> = service_requests::table
            .filter(dsl::kind.eq(TECHNICAL))
            .group_by(dsl::status)
            .select((dsl::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        let with_technician: i64 = service_requests::table
            .filter(dsl::kind.eq(TECHNICAL))
            .filter(dsl::technician_id.is_not_null())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(to_error)?;

        let mut stats = ServiceRequestStats::default();
        for (status, count) in by_status {
            let status: ServiceRequestStatus = status
                .parse()
                .map_err(|err: UnknownStatus| ServiceRequestRepositoryError::query(err.to_string()))?;
            stats.by_status.record(status, to_u64(count));
            stats.total += to_u64(count);
        }
        stats.with_technician = to_u64(with_technician);
        stats.without_technician = stats.total.saturating_sub(stats.with_technician);
        Ok(stats)
    }

    async fn assign_if_unassigned(
        &self,
        id: ServiceRequestId,
        technician: TechnicianId,
    ) -> Result<AssignOutcome, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let updated: Option<ServiceRequestRow> = diesel::update(
            service_requests::table
                .filter(dsl::id.eq(id.get()))
                .filter(dsl::kind.eq(TECHNICAL))
                .filter(dsl::technician_id.is_null())
                .filter(dsl::status.eq(ServiceRequestStatus::Pending.as_str())),
        )
        .set((
            dsl::technician_id.eq(technician.get()),
            dsl::status.eq(ServiceRequestStatus::Assigned.as_str()),
            dsl::updated_at.eq(now),
        ))
        .returning(ServiceRequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(to_error)?;
        if let Some(row) = updated {
            return decode(row).map(AssignOutcome::Assigned);
        }

        let current: Option<ServiceRequestRow> = technical_requests()
            .filter(dsl::id.eq(id.get()))
            .select(ServiceRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        let Some(current) = current.map(decode).transpose()? else {
            return Ok(AssignOutcome::NotFound);
        };
        Ok(if current.technician_id.is_some() {
            AssignOutcome::AlreadyAssigned(current)
        } else {
            AssignOutcome::NotPending(current)
        })
    }

    async fn transition_status(
        &self,
        id: ServiceRequestId,
        from: ServiceRequestStatus,
        to: ServiceRequestStatus,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let target = service_requests::table
            .filter(dsl::id.eq(id.get()))
            .filter(dsl::status.eq(from.as_str()));
        let result = if to.requires_technician() {
            diesel::update(target)
                .set((dsl::status.eq(to.as_str()), dsl::updated_at.eq(now)))
                .returning(ServiceRequestRow::as_returning())
                .get_result(&mut conn)
                .await
        } else {
            diesel::update(target)
                .set((
                    dsl::status.eq(to.as_str()),
                    dsl::technician_id.eq(None::<i64>),
                    dsl::updated_at.eq(now),
                ))
                .returning(ServiceRequestRow::as_returning())
                .get_result(&mut conn)
                .await
        };
        let row: Option<ServiceRequestRow> = result.optional().map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn replace(
        &self,
        request: &ServiceRequest,
        expected: AssignmentGuard,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<ServiceRequestRow> = diesel::update(
            service_requests::table
                .filter(dsl::id.eq(request.id.get()))
                .filter(dsl::status.eq(expected.status.as_str()))
                .filter(
                    dsl::technician_id
                        .is_not_distinct_from(expected.technician_id.map(TechnicianId::get)),
                ),
        )
        .set((
            ServiceRequestUpdate::from_request(request),
            dsl::updated_at.eq(now),
        ))
        .returning(ServiceRequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn delete(&self, id: ServiceRequestId) -> Result<bool, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let removed = diesel::delete(service_requests::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(to_error)?;
        Ok(removed > 0)
    }
}
