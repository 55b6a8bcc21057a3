//! Technician profiles and their derived rating figures.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{NewUserAccount, TechnicianId, UserId};

/// Profile row as stored, before ratings are folded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianProfile {
    #[schema(value_type = i64)]
    pub id: TechnicianId,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub availability_date: Option<NaiveDate>,
}

/// Technician as exposed by the directory.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    #[schema(value_type = i64)]
    pub id: TechnicianId,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub availability_date: Option<NaiveDate>,
    /// Mean review score rounded to one decimal; zero without reviews.
    pub average_rating: f64,
    pub reviews_count: u64,
}

impl Technician {
    #[must_use]
    pub fn from_profile(
        profile: TechnicianProfile,
        average_rating: f64,
        reviews_count: u64,
    ) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            city: profile.city,
            availability_date: profile.availability_date,
            average_rating,
            reviews_count,
        }
    }
}

/// Admin input creating a technician account together with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTechnician {
    pub account: NewUserAccount,
    pub availability_date: Option<NaiveDate>,
}

/// Admin update of a technician profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechnicianPatch {
    pub name: Option<String>,
    pub availability_date: Option<Option<NaiveDate>>,
}
