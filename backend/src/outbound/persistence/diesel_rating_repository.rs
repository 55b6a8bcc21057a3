//! PostgreSQL-backed `RatingRepository`.
//!
//! Aggregates come from two grouped queries: counts and sums per technician,
//! then the most recent row per technician via `DISTINCT ON`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RatingAggregate, RatingRepository, RatingRepositoryError};
use crate::domain::{NewRating, Rating, Score, ServiceRequestId, TechnicianId};

use super::error_mapping::DbFailure;
use super::models::{NewRatingRow, RatingRow, decode_score};
use super::pool::DbPool;
use super::schema::ratings::{self, dsl};

/// Fragment of the unique index guarding one rating per request.
const REQUEST_UNIQUE: &str = "technician_request";

#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_error(failure: impl Into<DbFailure>) -> RatingRepositoryError {
    match failure.into() {
        DbFailure::Connection(message) => RatingRepositoryError::connection(message),
        other => RatingRepositoryError::query(other.message()),
    }
}

type Totals = (i64, i64, Option<i64>);
type Latest = (i64, DateTime<Utc>, i32, i64);

async fn load_aggregates(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<RatingAggregate>, RatingRepositoryError> {
    let totals: Vec<Totals> = ratings::table
        .group_by(dsl::technician_id)
        .select((dsl::technician_id, count_star(), sum(dsl::score)))
        .load(conn)
        .await
        .map_err(to_error)?;
    let latest: Vec<Latest> = ratings::table
        .distinct_on(dsl::technician_id)
        .order_by((dsl::technician_id, dsl::created_at.desc(), dsl::id.desc()))
        .select((dsl::technician_id, dsl::created_at, dsl::score, dsl::id))
        .load(conn)
        .await
        .map_err(to_error)?;
    let mut latest: HashMap<i64, (DateTime<Utc>, Score)> = latest
        .into_iter()
        .map(|(technician_id, created_at, score, id)| {
            decode_score(id, score).map(|score| (technician_id, (created_at, score)))
        })
        .collect::<Result<_, _>>()
        .map_err(to_error)?;

    let mut aggregates: Vec<RatingAggregate> = totals
        .into_iter()
        .map(|(technician_id, total, score_sum)| {
            let newest = latest.remove(&technician_id);
            RatingAggregate {
                technician_id: TechnicianId::new(technician_id),
                total: u64::try_from(total).unwrap_or_default(),
                score_sum: score_sum
                    .and_then(|value| u64::try_from(value).ok())
                    .unwrap_or_default(),
                last_review: newest.map(|(at, _)| at),
                last_score: newest.map(|(_, score)| score),
            }
        })
        .collect();
    aggregates.sort_by_key(|aggregate| aggregate.technician_id);
    Ok(aggregates)
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn exists_for_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<bool, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        diesel::select(diesel::dsl::exists(
            ratings::table.filter(dsl::technician_request_id.eq(request_id.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(to_error)
    }

    async fn insert(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let request_id = rating.technician_request_id.get();
        let row = diesel::insert_into(ratings::table)
            .values(&NewRatingRow {
                technician_id: rating.technician_id.get(),
                user_id: rating.user_id.get(),
                technician_request_id: request_id,
                score: i32::from(rating.score.get()),
                description: rating.description.as_deref(),
            })
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                let failure = DbFailure::from(err);
                if matches!(failure, DbFailure::UniqueViolation { .. })
                    && failure.constraint_contains(REQUEST_UNIQUE)
                {
                    RatingRepositoryError::duplicate(request_id)
                } else {
                    to_error(failure)
                }
            })?;
        Rating::try_from(row).map_err(to_error)
    }

    async fn aggregates(&self) -> Result<Vec<RatingAggregate>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        load_aggregates(&mut conn).await
    }

    async fn aggregate_for(
        &self,
        technician: TechnicianId,
    ) -> Result<Option<RatingAggregate>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let aggregates = load_aggregates(&mut conn).await?;
        Ok(aggregates
            .into_iter()
            .find(|aggregate| aggregate.technician_id == technician))
    }
}
