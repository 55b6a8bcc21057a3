//! Driving port for claim reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Actor, ClaimFilter, ClaimRelation, ClaimStats, ClaimView, Error, IncludeSet};

#[async_trait]
pub trait ClaimQuery: Send + Sync {
    async fn list_own(
        &self,
        actor: &Actor,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<Vec<ClaimView>, Error>;

    async fn list_all(
        &self,
        actor: &Actor,
        filter: &ClaimFilter,
        page: PageRequest,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<Page<ClaimView>, Error>;

    async fn stats(&self, actor: &Actor) -> Result<ClaimStats, Error>;
}
