//! PostgreSQL-backed `ClaimRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, now};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{ClaimRepository, ClaimRepositoryError};
use crate::domain::{
    Claim, ClaimFilter, ClaimId, ClaimStats, ClaimStatus, NewClaim, UnknownStatus, UserId,
};

use super::error_mapping::{DbFailure, contains_pattern};
use super::models::{ClaimRow, ClaimUpdate, NewClaimRow};
use super::pool::DbPool;
use super::schema::claims::{self, dsl};

#[derive(Clone)]
pub struct DieselClaimRepository {
    pool: DbPool,
}

impl DieselClaimRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_error(failure: impl Into<DbFailure>) -> ClaimRepositoryError {
    match failure.into() {
        DbFailure::Connection(message) => ClaimRepositoryError::connection(message),
        fk @ DbFailure::ForeignKeyViolation { .. } => {
            ClaimRepositoryError::missing_reference(fk.message())
        }
        other => ClaimRepositoryError::query(other.message()),
    }
}

fn decode(row: ClaimRow) -> Result<Claim, ClaimRepositoryError> {
    Claim::try_from(row).map_err(to_error)
}

fn filtered(filter: &ClaimFilter) -> claims::BoxedQuery<'static, Pg> {
    let mut query = claims::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(dsl::status.eq(status.as_str()));
    }
    if let Some(needle) = filter.needle() {
        let pattern = contains_pattern(&needle);
        query = query.filter(
            dsl::subject
                .ilike(pattern.clone())
                .or(dsl::description.ilike(pattern)),
        );
    }
    query
}

fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl ClaimRepository for DieselClaimRepository {
    async fn insert(&self, claim: &NewClaim) -> Result<Claim, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row = diesel::insert_into(claims::table)
            .values(&NewClaimRow {
                requesting_user_id: claim.requesting_user_id.get(),
                category_id: claim.category_id.get(),
                status: ClaimStatus::Pending.as_str(),
                subject: &claim.subject,
                description: &claim.description,
            })
            .returning(ClaimRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(to_error)?;
        decode(row)
    }

    async fn find(&self, id: ClaimId) -> Result<Option<Claim>, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<ClaimRow> = claims::table
            .find(id.get())
            .select(ClaimRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Claim>, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows: Vec<ClaimRow> = claims::table
            .filter(dsl::requesting_user_id.eq(owner.get()))
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .select(ClaimRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn list_page(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<Claim>, u64), ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(to_error)?;
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows: Vec<ClaimRow> = filtered(filter)
            .order_by((dsl::created_at.desc(), dsl::id.desc()))
            .limit(i64::from(page.per_page()))
            .offset(offset)
            .select(ClaimRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        let data = rows.into_iter().map(decode).collect::<Result<_, _>>()?;
        Ok((data, to_u64(total)))
    }

    async fn stats(&self) -> Result<ClaimStats, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let by_status: Vec<(String, i64)> = claims::table
            .group_by(dsl::status)
            .select((dsl::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        let mut stats = ClaimStats::default();
        for (status, count) in by_status {
            let status: ClaimStatus = status
                .parse()
                .map_err(|err: UnknownStatus| ClaimRepositoryError::query(err.to_string()))?;
            stats.by_status.record(status, to_u64(count));
            stats.total += to_u64(count);
        }
        Ok(stats)
    }

    async fn answer(
        &self,
        id: ClaimId,
        answer: Option<String>,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Claim>, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let answerable = [ClaimStatus::Pending.as_str(), ClaimStatus::Answered.as_str()];
        let row: Option<ClaimRow> = diesel::update(
            claims::table
                .filter(dsl::id.eq(id.get()))
                .filter(dsl::status.eq_any(answerable)),
        )
        .set((
            dsl::status.eq(ClaimStatus::Answered.as_str()),
            dsl::answer.eq(answer),
            dsl::answered_at.eq(Some(answered_at)),
            dsl::updated_at.eq(answered_at),
        ))
        .returning(ClaimRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn replace(
        &self,
        claim: &Claim,
        expected: ClaimStatus,
    ) -> Result<Option<Claim>, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<ClaimRow> = diesel::update(
            claims::table
                .filter(dsl::id.eq(claim.id.get()))
                .filter(dsl::status.eq(expected.as_str())),
        )
        .set((ClaimUpdate::from_claim(claim), dsl::updated_at.eq(now)))
        .returning(ClaimRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(to_error)?;
        row.map(decode).transpose()
    }

    async fn delete(&self, id: ClaimId) -> Result<bool, ClaimRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let removed = diesel::delete(claims::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(to_error)?;
        Ok(removed > 0)
    }
}
