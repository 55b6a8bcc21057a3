//! Ratings and per-technician aggregates.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::ports::{RatingAggregate, RatingRepository, RatingRepositoryError};
use crate::domain::{NewRating, Rating, RatingId, ServiceRequestId, TechnicianId};

use super::MemoryStore;

fn aggregate<'a>(
    technician_id: TechnicianId,
    ratings: impl Iterator<Item = &'a Rating>,
) -> RatingAggregate {
    let mut aggregate = RatingAggregate {
        technician_id,
        total: 0,
        score_sum: 0,
        last_review: None,
        last_score: None,
    };
    let mut latest: Option<&Rating> = None;
    for rating in ratings {
        aggregate.total += 1;
        aggregate.score_sum += u64::from(rating.score.get());
        if latest.is_none_or(|seen| (rating.created_at, rating.id) >= (seen.created_at, seen.id)) {
            latest = Some(rating);
        }
    }
    aggregate.last_review = latest.map(|rating| rating.created_at);
    aggregate.last_score = latest.map(|rating| rating.score);
    aggregate
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn exists_for_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<bool, RatingRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .any(|rating| rating.technician_request_id == Some(request_id)))
    }

    async fn insert(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .ratings
            .values()
            .any(|stored| stored.technician_request_id == Some(rating.technician_request_id))
        {
            return Err(RatingRepositoryError::duplicate(
                rating.technician_request_id.get(),
            ));
        }
        let id = tables.next_id();
        let stored = Rating {
            id: RatingId::new(id),
            technician_id: rating.technician_id,
            user_id: rating.user_id,
            technician_request_id: Some(rating.technician_request_id),
            score: rating.score,
            description: rating.description.clone(),
            created_at: self.now(),
        };
        tables.ratings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn aggregates(&self) -> Result<Vec<RatingAggregate>, RatingRepositoryError> {
        let tables = self.tables.read().await;
        let mut by_technician: BTreeMap<TechnicianId, Vec<&Rating>> = BTreeMap::new();
        for rating in tables.ratings.values() {
            by_technician
                .entry(rating.technician_id)
                .or_default()
                .push(rating);
        }
        Ok(by_technician
            .into_iter()
            .map(|(technician_id, ratings)| aggregate(technician_id, ratings.into_iter()))
            .collect())
    }

    async fn aggregate_for(
        &self,
        technician: TechnicianId,
    ) -> Result<Option<RatingAggregate>, RatingRepositoryError> {
        let tables = self.tables.read().await;
        let ratings: Vec<_> = tables
            .ratings
            .values()
            .filter(|rating| rating.technician_id == technician)
            .collect();
        if ratings.is_empty() {
            return Ok(None);
        }
        Ok(Some(aggregate(technician, ratings.into_iter())))
    }
}
