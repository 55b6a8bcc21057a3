//! Port for claim persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{Claim, ClaimFilter, ClaimId, ClaimStats, ClaimStatus, NewClaim, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by claim repository adapters.
    pub enum ClaimRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "claim repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "claim repository query failed: {message}",
        /// A referenced category does not exist.
        MissingReference { message: String } =>
            "claim references a missing record: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn insert(&self, claim: &NewClaim) -> Result<Claim, ClaimRepositoryError>;

    async fn find(&self, id: ClaimId) -> Result<Option<Claim>, ClaimRepositoryError>;

    /// Claims filed by `owner`, newest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Claim>, ClaimRepositoryError>;

    /// One page of claims matching `filter` plus the total match count.
    async fn list_page(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<Claim>, u64), ClaimRepositoryError>;

    async fn stats(&self) -> Result<ClaimStats, ClaimRepositoryError>;

    /// Write answer, `answered_at` and `status = answered` in one statement,
    /// only while the claim is pending or answered.
    async fn answer(
        &self,
        id: ClaimId,
        answer: Option<String>,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Claim>, ClaimRepositoryError>;

    /// Overwrite mutable fields if the stored status still equals `expected`.
    async fn replace(
        &self,
        claim: &Claim,
        expected: ClaimStatus,
    ) -> Result<Option<Claim>, ClaimRepositoryError>;

    async fn delete(&self, id: ClaimId) -> Result<bool, ClaimRepositoryError>;
}
