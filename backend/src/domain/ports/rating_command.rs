//! Driving ports for ratings.

use async_trait::async_trait;

use crate::domain::{Error, Rating, RatingSummary, Score, ServiceRequestId, TechnicianId, UserId};

#[async_trait]
pub trait RatingCommand: Send + Sync {
    /// Rate the technician who handled `request_id`.
    async fn create_rating(
        &self,
        actor_user_id: UserId,
        technician_id: TechnicianId,
        request_id: ServiceRequestId,
        score: Score,
        description: Option<String>,
    ) -> Result<Rating, Error>;
}

#[async_trait]
pub trait RatingQuery: Send + Sync {
    /// One summary per rated technician.
    async fn summaries(&self) -> Result<Vec<RatingSummary>, Error>;
}
