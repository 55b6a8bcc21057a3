//! Claims raised by users and answered by administrators.
//!
//! `pending` may move to `completed`, `cancelled` or `answered`; `answered`
//! may be answered again or closed. `completed` and `cancelled` are
//! terminal. `answered_at` is set exactly while the claim is `answered`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CategoryId, ClaimId, UnknownStatus, UserId, service_request::SUBJECT_MAX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Completed,
    Cancelled,
    Answered,
}

impl ClaimStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Completed,
        Self::Cancelled,
        Self::Answered,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Answered => "answered",
        }
    }

    /// Whether `next` is reachable from `self`. Re-answering is an edge.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending | Self::Answered,
                Self::Completed | Self::Cancelled | Self::Answered
            )
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[schema(value_type = i64)]
    pub id: ClaimId,
    #[schema(value_type = i64)]
    pub requesting_user_id: UserId,
    #[schema(value_type = i64)]
    pub category_id: CategoryId,
    pub status: ClaimStatus,
    pub subject: String,
    pub description: String,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.requesting_user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValidationError {
    EmptySubject,
    SubjectTooLong { max: usize },
    EmptyDescription,
}

impl ClaimValidationError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptySubject | Self::SubjectTooLong { .. } => "subject",
            Self::EmptyDescription => "description",
        }
    }
}

impl fmt::Display for ClaimValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySubject => write!(f, "subject must not be empty"),
            Self::SubjectTooLong { max } => write!(f, "subject must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
        }
    }
}

impl std::error::Error for ClaimValidationError {}

fn validate_subject(subject: &str) -> Result<String, ClaimValidationError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ClaimValidationError::EmptySubject);
    }
    if subject.chars().count() > SUBJECT_MAX {
        return Err(ClaimValidationError::SubjectTooLong { max: SUBJECT_MAX });
    }
    Ok(subject.to_owned())
}

fn validate_description(description: &str) -> Result<String, ClaimValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ClaimValidationError::EmptyDescription);
    }
    Ok(description.to_owned())
}

/// Blank answers clear the text while the claim is still marked answered.
#[must_use]
pub fn normalise_answer(answer: Option<String>) -> Option<String> {
    answer.map(|a| a.trim().to_owned()).filter(|a| !a.is_empty())
}

/// Validated input for a new claim. Always starts `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub requesting_user_id: UserId,
    pub category_id: CategoryId,
    pub subject: String,
    pub description: String,
}

impl NewClaim {
    pub fn try_new(
        owner: UserId,
        category_id: CategoryId,
        subject: &str,
        description: &str,
    ) -> Result<Self, ClaimValidationError> {
        Ok(Self {
            requesting_user_id: owner,
            category_id,
            subject: validate_subject(subject)?,
            description: validate_description(description)?,
        })
    }
}

/// Admin field update for a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimPatch {
    pub category_id: Option<CategoryId>,
    pub status: Option<ClaimStatus>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub answer: Option<Option<String>>,
}

impl ClaimPatch {
    /// Merge into `current`. Setting `answered` stamps `answered_at` with
    /// `now`; leaving `answered` clears it but keeps the answer text.
    pub fn apply_to(
        self,
        current: &Claim,
        now: DateTime<Utc>,
    ) -> Result<Claim, ClaimValidationError> {
        let mut next = current.clone();
        if let Some(category_id) = self.category_id {
            next.category_id = category_id;
        }
        if let Some(subject) = self.subject {
            next.subject = validate_subject(&subject)?;
        }
        if let Some(description) = self.description {
            next.description = validate_description(&description)?;
        }
        if let Some(answer) = self.answer {
            next.answer = normalise_answer(answer);
        }
        match self.status {
            Some(ClaimStatus::Answered) => {
                next.status = ClaimStatus::Answered;
                next.answered_at = Some(now);
            }
            Some(status) => {
                next.status = status;
                next.answered_at = None;
            }
            None => {}
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
    pub search: Option<String>,
}

impl ClaimFilter {
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    #[must_use]
    pub fn matches(&self, claim: &Claim) -> bool {
        if self.status.is_some_and(|status| status != claim.status) {
            return false;
        }
        self.needle().is_none_or(|needle| {
            claim.subject.to_lowercase().contains(&needle)
                || claim.description.to_lowercase().contains(&needle)
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClaimStatusCounts {
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub answered: u64,
}

impl ClaimStatusCounts {
    pub fn record(&mut self, status: ClaimStatus, count: u64) {
        let slot = match status {
            ClaimStatus::Pending => &mut self.pending,
            ClaimStatus::Completed => &mut self.completed,
            ClaimStatus::Cancelled => &mut self.cancelled,
            ClaimStatus::Answered => &mut self.answered,
        };
        *slot += count;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStats {
    pub total: u64,
    pub by_status: ClaimStatusCounts,
}
