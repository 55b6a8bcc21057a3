//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live here so
//! every repository decodes stored text columns the same way.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{
    Category, CategoryId, Claim, ClaimId, ClaimStatus, ContactDetails, Rating, RatingId, RequestKind,
    Role, Score, ServiceRequest, ServiceRequestId, ServiceRequestStatus, TechnicianId,
    TechnicianProfile, UserAccount, UserId,
};

use super::schema::{categories, claims, ratings, service_requests, technicians, users};

/// Failure decoding a stored row; adapters report it as a query error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(crate) struct RowDecodeError {
    pub table: &'static str,
    pub id: i64,
    pub reason: String,
}

fn decode<T: FromStr>(table: &'static str, id: i64, value: &str) -> Result<T, RowDecodeError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| RowDecodeError {
        table,
        id,
        reason: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub dni: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_account(self) -> Result<UserAccount, RowDecodeError> {
        let role: Role = decode("users", self.id, &self.role)?;
        Ok(UserAccount {
            id: UserId::new(self.id),
            name: self.name,
            email: self.email,
            role,
            contact: ContactDetails {
                dni: self.dni,
                phone: self.phone,
                address: self.address,
                city: self.city,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub dni: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
}

impl<'a> NewUserRow<'a> {
    pub fn from_record(record: &'a crate::domain::NewUserRecord) -> Self {
        Self {
            name: &record.name,
            email: &record.email,
            password_hash: &record.password_hash,
            role: record.role.as_str(),
            dni: record.contact.dni.as_deref(),
            phone: record.contact.phone.as_deref(),
            address: record.contact.address.as_deref(),
            city: record.contact.city.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Categories and technicians
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = technicians)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TechnicianRow {
    pub id: i64,
    pub user_id: i64,
    pub availability_date: Option<NaiveDate>,
}

/// A technician row joined with its account.
pub(crate) fn technician_profile(technician: TechnicianRow, user: UserRow) -> TechnicianProfile {
    TechnicianProfile {
        id: TechnicianId::new(technician.id),
        user_id: UserId::new(technician.user_id),
        name: user.name,
        email: user.email,
        phone: user.phone,
        city: user.city,
        availability_date: technician.availability_date,
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = technicians)]
pub(crate) struct NewTechnicianRow {
    pub user_id: i64,
    pub availability_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Service requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceRequestRow {
    pub id: i64,
    pub requesting_user_id: i64,
    pub technician_id: Option<i64>,
    pub category_id: i64,
    pub claim_id: Option<i64>,
    pub kind: String,
    pub status: String,
    pub subject: String,
    pub description: String,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRequestRow> for ServiceRequest {
    type Error = RowDecodeError;

    fn try_from(row: ServiceRequestRow) -> Result<Self, Self::Error> {
        let status: ServiceRequestStatus = decode("service_requests", row.id, &row.status)?;
        let kind = RequestKind::from_db(&row.kind).ok_or_else(|| RowDecodeError {
            table: "service_requests",
            id: row.id,
            reason: format!("unknown kind {}", row.kind),
        })?;
        Ok(Self {
            id: ServiceRequestId::new(row.id),
            requesting_user_id: UserId::new(row.requesting_user_id),
            technician_id: row.technician_id.map(TechnicianId::new),
            category_id: CategoryId::new(row.category_id),
            claim_id: row.claim_id.map(ClaimId::new),
            kind,
            status,
            subject: row.subject,
            description: row.description,
            wanted_date_start: row.wanted_date_start,
            wanted_date_end: row.wanted_date_end,
            time_shift: row.time_shift,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = service_requests)]
pub(crate) struct NewServiceRequestRow<'a> {
    pub requesting_user_id: i64,
    pub category_id: i64,
    pub claim_id: Option<i64>,
    pub kind: &'a str,
    pub status: &'a str,
    pub subject: &'a str,
    pub description: &'a str,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: &'a str,
}

/// Full overwrite of the mutable columns; `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = service_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ServiceRequestUpdate<'a> {
    pub technician_id: Option<i64>,
    pub category_id: i64,
    pub claim_id: Option<i64>,
    pub status: &'a str,
    pub subject: &'a str,
    pub description: &'a str,
    pub wanted_date_start: NaiveDate,
    pub wanted_date_end: NaiveDate,
    pub time_shift: &'a str,
}

impl<'a> ServiceRequestUpdate<'a> {
    pub fn from_request(request: &'a ServiceRequest) -> Self {
        Self {
            technician_id: request.technician_id.map(TechnicianId::get),
            category_id: request.category_id.get(),
            claim_id: request.claim_id.map(ClaimId::get),
            status: request.status.as_str(),
            subject: &request.subject,
            description: &request.description,
            wanted_date_start: request.wanted_date_start,
            wanted_date_end: request.wanted_date_end,
            time_shift: &request.time_shift,
        }
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = claims)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClaimRow {
    pub id: i64,
    pub requesting_user_id: i64,
    pub category_id: i64,
    pub status: String,
    pub subject: String,
    pub description: String,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = RowDecodeError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status: ClaimStatus = decode("claims", row.id, &row.status)?;
        Ok(Self {
            id: ClaimId::new(row.id),
            requesting_user_id: UserId::new(row.requesting_user_id),
            category_id: CategoryId::new(row.category_id),
            status,
            subject: row.subject,
            description: row.description,
            answer: row.answer,
            answered_at: row.answered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = claims)]
pub(crate) struct NewClaimRow<'a> {
    pub requesting_user_id: i64,
    pub category_id: i64,
    pub status: &'a str,
    pub subject: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = claims)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ClaimUpdate<'a> {
    pub category_id: i64,
    pub status: &'a str,
    pub subject: &'a str,
    pub description: &'a str,
    pub answer: Option<&'a str>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl<'a> ClaimUpdate<'a> {
    pub fn from_claim(claim: &'a Claim) -> Self {
        Self {
            category_id: claim.category_id.get(),
            status: claim.status.as_str(),
            subject: &claim.subject,
            description: &claim.description,
            answer: claim.answer.as_deref(),
            answered_at: claim.answered_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: i64,
    pub technician_id: i64,
    pub user_id: i64,
    pub technician_request_id: Option<i64>,
    pub score: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Decode a stored score; the column carries a CHECK for the valid range.
pub(crate) fn decode_score(id: i64, score: i32) -> Result<Score, RowDecodeError> {
    Score::new(i64::from(score)).map_err(|err| RowDecodeError {
        table: "ratings",
        id,
        reason: err.to_string(),
    })
}

impl TryFrom<RatingRow> for Rating {
    type Error = RowDecodeError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatingId::new(row.id),
            technician_id: TechnicianId::new(row.technician_id),
            user_id: UserId::new(row.user_id),
            technician_request_id: row.technician_request_id.map(ServiceRequestId::new),
            score: decode_score(row.id, row.score)?,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub technician_id: i64,
    pub user_id: i64,
    pub technician_request_id: i64,
    pub score: i32,
    pub description: Option<&'a str>,
}
