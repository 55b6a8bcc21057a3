//! Port for rating persistence and per-technician aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewRating, Rating, Score, ServiceRequestId, TechnicianId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "rating repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "rating repository query failed: {message}",
        /// The request has already been rated.
        Duplicate { request_id: i64 } => "service request {request_id} already rated",
    }
}

/// Raw rating figures for one technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingAggregate {
    pub technician_id: TechnicianId,
    pub total: u64,
    pub score_sum: u64,
    pub last_review: Option<DateTime<Utc>>,
    pub last_score: Option<Score>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Whether a rating already references `request_id`.
    async fn exists_for_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<bool, RatingRepositoryError>;

    /// Insert a rating. Adapters report a uniqueness collision on the request
    /// as [`RatingRepositoryError::Duplicate`].
    async fn insert(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError>;

    /// Aggregates for every technician with at least one rating.
    async fn aggregates(&self) -> Result<Vec<RatingAggregate>, RatingRepositoryError>;

    async fn aggregate_for(
        &self,
        technician: TechnicianId,
    ) -> Result<Option<RatingAggregate>, RatingRepositoryError>;
}
