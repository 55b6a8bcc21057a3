//! Bundle of driven-port implementations handed to the service layer.

use std::sync::Arc;

use mockable::Clock;

use super::{
    CategoryRepository, ClaimRepository, PasswordHasher, RatingRepository,
    ServiceRequestRepository, TechnicianRepository, UserRepository,
};

/// Every outbound dependency the workflow services need. Built once at
/// start-up from either the PostgreSQL or the in-memory adapters.
#[derive(Clone)]
pub struct DrivenPorts {
    pub users: Arc<dyn UserRepository>,
    pub technicians: Arc<dyn TechnicianRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub service_requests: Arc<dyn ServiceRequestRepository>,
    pub claims: Arc<dyn ClaimRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}
