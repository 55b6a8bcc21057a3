//! Driving port for claim mutations.

use async_trait::async_trait;

use crate::domain::{Actor, CategoryId, Claim, ClaimId, ClaimPatch, ClaimStatus, Error};

#[async_trait]
pub trait ClaimCommand: Send + Sync {
    async fn create(
        &self,
        actor: &Actor,
        category_id: CategoryId,
        subject: &str,
        description: &str,
    ) -> Result<Claim, Error>;

    /// Record the admin answer and mark the claim answered.
    async fn answer(
        &self,
        actor: &Actor,
        id: ClaimId,
        answer: Option<String>,
    ) -> Result<Claim, Error>;

    async fn update(&self, actor: &Actor, id: ClaimId, patch: ClaimPatch) -> Result<Claim, Error>;

    async fn update_status(
        &self,
        actor: &Actor,
        id: ClaimId,
        status: ClaimStatus,
    ) -> Result<Claim, Error>;

    async fn delete(&self, actor: &Actor, id: ClaimId) -> Result<(), Error>;
}
