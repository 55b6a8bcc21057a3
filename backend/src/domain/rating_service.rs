//! Rating linkage and per-technician summaries.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::policy;
use super::port_call::{PortCall, Reported};
use super::ports::{
    RatingAggregate, RatingCommand, RatingQuery, RatingRepository, ServiceRequestRepository,
    TechnicianRepository,
};
use super::rating::round_to;
use super::{
    Error, NewRating, Rating, RatingSummary, RequestKind, Score, ServiceRequestId, TechnicianId,
    UserId,
};

/// Mean of an aggregate rounded to `places` decimals; zero without ratings.
pub(crate) fn aggregate_average(aggregate: &RatingAggregate, places: i32) -> f64 {
    if aggregate.total == 0 {
        return 0.0;
    }
    round_to(aggregate.score_sum as f64 / aggregate.total as f64, places)
}

/// Implements [`RatingCommand`] and [`RatingQuery`].
#[derive(Clone)]
pub struct RatingService<R: ?Sized> {
    ratings: Arc<R>,
    requests: Arc<dyn ServiceRequestRepository>,
    technicians: Arc<dyn TechnicianRepository>,
}

impl<R: ?Sized> RatingService<R> {
    pub fn new(
        ratings: Arc<R>,
        requests: Arc<dyn ServiceRequestRepository>,
        technicians: Arc<dyn TechnicianRepository>,
    ) -> Self {
        Self {
            ratings,
            requests,
            technicians,
        }
    }
}

#[async_trait]
impl<R> RatingCommand for RatingService<R>
where
    R: RatingRepository + ?Sized,
{
    async fn create_rating(
        &self,
        actor_user_id: UserId,
        technician_id: TechnicianId,
        request_id: ServiceRequestId,
        score: Score,
        description: Option<String>,
    ) -> Result<Rating, Error> {
        let call = PortCall::new("create_rating")
            .by_user(actor_user_id)
            .request(request_id)
            .technician(technician_id);
        let request = self
            .requests
            .find(request_id)
            .await
            .reported(&call)?
            .filter(|request| request.kind == RequestKind::TechnicalService)
            .ok_or_else(|| Error::not_found(format!("service request {request_id} not found")))?;
        let already_rated = self
            .ratings
            .exists_for_request(request_id)
            .await
            .reported(&call)?;
        policy::enforce(
            policy::create_rating(actor_user_id, &request, technician_id, already_rated),
            Some(actor_user_id),
        )?;

        let new_rating = NewRating {
            technician_id,
            user_id: actor_user_id,
            technician_request_id: request_id,
            score,
            description: description
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
        };
        // The unique index settles two concurrent first ratings.
        let rating = self.ratings.insert(&new_rating).await.reported(&call)?;
        info!(
            actor_id = actor_user_id.get(),
            request_id = request_id.get(),
            technician_id = technician_id.get(),
            score = score.get(),
            "rating created"
        );
        Ok(rating)
    }
}

#[async_trait]
impl<R> RatingQuery for RatingService<R>
where
    R: RatingRepository + ?Sized,
{
    async fn summaries(&self) -> Result<Vec<RatingSummary>, Error> {
        let call = PortCall::new("rating_summaries");
        let aggregates = self.ratings.aggregates().await.reported(&call)?;
        let mut summaries = Vec::with_capacity(aggregates.len());
        for aggregate in aggregates {
            let name = self
                .technicians
                .find(aggregate.technician_id)
                .await
                .reported(&call.technician(aggregate.technician_id))?
                .map(|profile| profile.name)
                .unwrap_or_default();
            summaries.push(RatingSummary {
                technician_id: aggregate.technician_id,
                name,
                average: aggregate_average(&aggregate, 2),
                total: aggregate.total,
                last_review: aggregate.last_review,
                last_score: aggregate.last_score,
            });
        }
        summaries.sort_by_key(|summary| summary.technician_id);
        Ok(summaries)
    }
}
