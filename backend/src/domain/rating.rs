//! Ratings left by requesters for the technician who served them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{RatingId, ServiceRequestId, TechnicianId, UserId};

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 5;

/// Integer score in `SCORE_MIN..=SCORE_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = u8)]
pub struct Score(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("score must be between {SCORE_MIN} and {SCORE_MAX}, got {0}")]
pub struct ScoreOutOfRange(pub i64);

impl Score {
    pub fn new(value: i64) -> Result<Self, ScoreOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|v| (SCORE_MIN..=SCORE_MAX).contains(v))
            .map(Self)
            .ok_or(ScoreOutOfRange(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[schema(value_type = i64)]
    pub id: RatingId,
    #[schema(value_type = i64)]
    pub technician_id: TechnicianId,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    #[schema(value_type = Option<i64>)]
    pub technician_request_id: Option<ServiceRequestId>,
    #[schema(value_type = u8, minimum = 1, maximum = 5)]
    pub score: Score,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rating ready to persist once linkage checks have passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub technician_id: TechnicianId,
    pub user_id: UserId,
    pub technician_request_id: ServiceRequestId,
    pub score: Score,
    pub description: Option<String>,
}

/// Per-technician aggregate shown on the ratings overview.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    #[schema(value_type = i64)]
    pub technician_id: TechnicianId,
    pub name: String,
    /// Mean score rounded to two decimals.
    pub average: f64,
    pub total: u64,
    pub last_review: Option<DateTime<Utc>>,
    #[schema(value_type = Option<u8>)]
    pub last_score: Option<Score>,
}

/// Round half away from zero to `places` decimals.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Mean of `scores`, or zero when there are none.
#[must_use]
pub fn mean_score(scores: impl IntoIterator<Item = Score>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0_u64, 0_u64), |(sum, count), s| (sum + u64::from(s.get()), count + 1));
    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}
