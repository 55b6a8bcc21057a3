//! Service requests and their lifecycle graph.
//!
//! ```text
//! pending ──► assigned ──► completed
//!    │            │
//!    └──► cancelled ◄┘
//! ```
//!
//! `completed` and `cancelled` are terminal. A request carries a technician
//! exactly when it is `assigned` or `completed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CategoryId, ClaimId, ServiceRequestId, TechnicianId, TimeShift, UserId};

/// Maximum subject length in characters.
pub const SUBJECT_MAX: usize = 255;

/// Lifecycle state of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Pending,
    Assigned,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Assigned,
        Self::Completed,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a request in this state must reference a technician.
    #[must_use]
    pub const fn requires_technician(self) -> bool {
        matches!(self, Self::Assigned | Self::Completed)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Edges of the lifecycle graph. Staying in place is not an edge.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Assigned)
                | (Self::Pending, Self::Cancelled)
                | (Self::Assigned, Self::Completed)
                | (Self::Assigned, Self::Cancelled)
        )
    }
}

impl fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status token is not a member of the status enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ServiceRequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

/// Stored request kind. Only technical-service rows belong to this workflow;
/// legacy rows of kind `claim` stay invisible to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    TechnicalService,
    Claim,
}

impl RequestKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TechnicalService => "technical_service",
            Self::Claim => "claim",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "technical_service" => Some(Self::TechnicalService),
            "claim" => Some(Self::Claim),
            _ => None,
        }
    }
}

/// A persisted service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[schema(value_type = i64)]
    pub id: ServiceRequestId,
    #[schema(value_type = i64)]
    pub requesting_user_id: UserId,
    #[schema(value_type = Option<i64>)]
    pub technician_id: Option<TechnicianId>,
    #[schema(value_type = i64)]
    pub category_id: CategoryId,
    #[schema(value_type = Option<i64>)]
    pub claim_id: Option<ClaimId>,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub status: ServiceRequestStatus,
    pub subject: String,
    pub description: String,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.requesting_user_id == user_id
    }

    #[must_use]
    pub fn is_assigned_to(&self, technician_id: Option<TechnicianId>) -> bool {
        technician_id.is_some() && self.technician_id == technician_id
    }
}

/// Validation failures for request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequestValidationError {
    EmptySubject,
    SubjectTooLong { max: usize },
    EmptyDescription,
    WindowEndsBeforeStart,
    UnknownTimeShift(String),
    TechnicianRequired(ServiceRequestStatus),
    TechnicianNotAllowed(ServiceRequestStatus),
}

impl ServiceRequestValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptySubject | Self::SubjectTooLong { .. } => "subject",
            Self::EmptyDescription => "description",
            Self::WindowEndsBeforeStart => "wantedDateEnd",
            Self::UnknownTimeShift(_) => "timeShift",
            Self::TechnicianRequired(_) | Self::TechnicianNotAllowed(_) => "technicianId",
        }
    }
}

impl fmt::Display for ServiceRequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySubject => write!(f, "subject must not be empty"),
            Self::SubjectTooLong { max } => write!(f, "subject must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::WindowEndsBeforeStart => {
                write!(f, "wanted date end must not be before wanted date start")
            }
            Self::UnknownTimeShift(token) => write!(f, "unknown time shift: {token}"),
            Self::TechnicianRequired(status) => {
                write!(f, "status {status} requires a technician")
            }
            Self::TechnicianNotAllowed(status) => {
                write!(f, "status {status} must not carry a technician")
            }
        }
    }
}

impl std::error::Error for ServiceRequestValidationError {}

fn validate_subject(subject: &str) -> Result<String, ServiceRequestValidationError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ServiceRequestValidationError::EmptySubject);
    }
    if subject.chars().count() > SUBJECT_MAX {
        return Err(ServiceRequestValidationError::SubjectTooLong { max: SUBJECT_MAX });
    }
    Ok(subject.to_owned())
}

fn validate_description(description: &str) -> Result<String, ServiceRequestValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ServiceRequestValidationError::EmptyDescription);
    }
    Ok(description.to_owned())
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), ServiceRequestValidationError> {
    if end < start {
        return Err(ServiceRequestValidationError::WindowEndsBeforeStart);
    }
    Ok(())
}

fn validate_time_shift(token: &str) -> Result<String, ServiceRequestValidationError> {
    let token = token.trim();
    TimeShift::lookup(token)
        .map(|shift| shift.name.to_owned())
        .ok_or_else(|| ServiceRequestValidationError::UnknownTimeShift(token.to_owned()))
}

/// Validated input for a new request. Always starts `pending` and unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRequest {
    pub requesting_user_id: UserId,
    pub category_id: CategoryId,
    pub claim_id: Option<ClaimId>,
    pub subject: String,
    pub description: String,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: String,
}

/// Raw fields for [`NewServiceRequest::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequestDraft {
    pub category_id: CategoryId,
    pub claim_id: Option<ClaimId>,
    pub subject: String,
    pub description: String,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: String,
}

impl NewServiceRequest {
    pub fn try_new(
        owner: UserId,
        draft: ServiceRequestDraft,
    ) -> Result<Self, ServiceRequestValidationError> {
        let subject = validate_subject(&draft.subject)?;
        let description = validate_description(&draft.description)?;
        validate_window(draft.wanted_date_start, draft.wanted_date_end)?;
        let time_shift = validate_time_shift(&draft.time_shift)?;
        Ok(Self {
            requesting_user_id: owner,
            category_id: draft.category_id,
            claim_id: draft.claim_id,
            subject,
            description,
            wanted_date_start: draft.wanted_date_start,
            wanted_date_end: draft.wanted_date_end,
            time_shift,
        })
    }
}

/// Admin full-field update. `None` leaves a field untouched; the nested
/// options on `technician_id` and `claim_id` allow clearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequestPatch {
    pub category_id: Option<CategoryId>,
    pub claim_id: Option<Option<ClaimId>>,
    pub technician_id: Option<Option<TechnicianId>>,
    pub status: Option<ServiceRequestStatus>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub wanted_date_start: Option<NaiveDate>,
    pub wanted_date_end: Option<NaiveDate>,
    pub time_shift: Option<String>,
}

impl ServiceRequestPatch {
    /// Merge the patch into `current`, validating the merged record.
    ///
    /// Moving to `pending` or `cancelled` without naming a technician drops
    /// the current one so status and assignment stay coupled.
    pub fn apply_to(
        self,
        current: &ServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestValidationError> {
        let mut next = current.clone();
        if let Some(category_id) = self.category_id {
            next.category_id = category_id;
        }
        if let Some(claim_id) = self.claim_id {
            next.claim_id = claim_id;
        }
        if let Some(subject) = self.subject {
            next.subject = validate_subject(&subject)?;
        }
        if let Some(description) = self.description {
            next.description = validate_description(&description)?;
        }
        if let Some(start) = self.wanted_date_start {
            next.wanted_date_start = start;
        }
        if let Some(end) = self.wanted_date_end {
            next.wanted_date_end = end;
        }
        validate_window(next.wanted_date_start, next.wanted_date_end)?;
        if let Some(time_shift) = self.time_shift {
            next.time_shift = validate_time_shift(&time_shift)?;
        }

        let status = self.status.unwrap_or(current.status);
        next.status = status;
        next.technician_id = match (self.technician_id, status.requires_technician()) {
            (Some(Some(_)), false) => {
                return Err(ServiceRequestValidationError::TechnicianNotAllowed(status));
            }
            (Some(None), true) => {
                return Err(ServiceRequestValidationError::TechnicianRequired(status));
            }
            (Some(explicit), _) => explicit,
            (None, true) => Some(
                current
                    .technician_id
                    .ok_or(ServiceRequestValidationError::TechnicianRequired(status))?,
            ),
            (None, false) => None,
        };
        Ok(next)
    }
}

/// Filters accepted by the admin listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequestFilter {
    pub status: Option<ServiceRequestStatus>,
    pub technician_id: Option<TechnicianId>,
    pub search: Option<String>,
}

impl ServiceRequestFilter {
    /// Trimmed, lowercased search needle when one was supplied.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// In-process evaluation of the filter, mirroring the SQL adapter.
    #[must_use]
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        if self.status.is_some_and(|status| status != request.status) {
            return false;
        }
        if self.technician_id.is_some() && self.technician_id != request.technician_id {
            return false;
        }
        match self.needle() {
            Some(needle) => {
                request.subject.to_lowercase().contains(&needle)
                    || request.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServiceRequestStatusCounts {
    pub pending: u64,
    pub assigned: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl ServiceRequestStatusCounts {
    pub fn record(&mut self, status: ServiceRequestStatus, count: u64) {
        let slot = match status {
            ServiceRequestStatus::Pending => &mut self.pending,
            ServiceRequestStatus::Assigned => &mut self.assigned,
            ServiceRequestStatus::Completed => &mut self.completed,
            ServiceRequestStatus::Cancelled => &mut self.cancelled,
        };
        *slot += count;
    }
}

/// Aggregate figures for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestStats {
    pub total: u64,
    pub by_status: ServiceRequestStatusCounts,
    pub without_technician: u64,
    pub with_technician: u64,
}

#[cfg(test)]
#[path = "service_request_tests.rs"]
mod tests;
