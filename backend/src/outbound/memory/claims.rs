//! Claims, including the atomic answer write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{ClaimRepository, ClaimRepositoryError};
use crate::domain::{
    Claim, ClaimFilter, ClaimId, ClaimStats, ClaimStatus, NewClaim, UserId,
};

use super::{MemoryStore, newest_first};

#[async_trait]
impl ClaimRepository for MemoryStore {
    async fn insert(&self, claim: &NewClaim) -> Result<Claim, ClaimRepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&claim.category_id.get()) {
            return Err(ClaimRepositoryError::missing_reference(format!(
                "category {}",
                claim.category_id
            )));
        }
        let now = self.now();
        let id = tables.next_id();
        let stored = Claim {
            id: ClaimId::new(id),
            requesting_user_id: claim.requesting_user_id,
            category_id: claim.category_id,
            status: ClaimStatus::Pending,
            subject: claim.subject.clone(),
            description: claim.description.clone(),
            answer: None,
            answered_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.claims.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: ClaimId) -> Result<Option<Claim>, ClaimRepositoryError> {
        Ok(self.tables.read().await.claims.get(&id.get()).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Claim>, ClaimRepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .claims
            .values()
            .filter(|claim| claim.requesting_user_id == owner)
            .cloned()
            .collect();
        newest_first(&mut rows, |claim| (claim.created_at, claim.id.get()));
        Ok(rows)
    }

    async fn list_page(
        &self,
        filter: &ClaimFilter,
        page: PageRequest,
    ) -> Result<(Vec<Claim>, u64), ClaimRepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .claims
            .values()
            .filter(|claim| filter.matches(claim))
            .cloned()
            .collect();
        newest_first(&mut rows, |claim| (claim.created_at, claim.id.get()));
        let total = rows.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data = rows
            .into_iter()
            .skip(offset)
            .take(page.per_page() as usize)
            .collect();
        Ok((data, total))
    }

    async fn stats(&self) -> Result<ClaimStats, ClaimRepositoryError> {
        let tables = self.tables.read().await;
        let mut stats = ClaimStats::default();
        for claim in tables.claims.values() {
            stats.total += 1;
            stats.by_status.record(claim.status, 1);
        }
        Ok(stats)
    }

    async fn answer(
        &self,
        id: ClaimId,
        answer: Option<String>,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Claim>, ClaimRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(claim) = tables
            .claims
            .get_mut(&id.get())
            .filter(|claim| claim.status.can_transition_to(ClaimStatus::Answered))
        else {
            return Ok(None);
        };
        claim.status = ClaimStatus::Answered;
        claim.answer = answer;
        claim.answered_at = Some(answered_at);
        claim.updated_at = answered_at;
        Ok(Some(claim.clone()))
    }

    async fn replace(
        &self,
        claim: &Claim,
        expected: ClaimStatus,
    ) -> Result<Option<Claim>, ClaimRepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&claim.category_id.get()) {
            return Err(ClaimRepositoryError::missing_reference(format!(
                "category {}",
                claim.category_id
            )));
        }
        let now = self.now();
        let Some(stored) = tables
            .claims
            .get_mut(&claim.id.get())
            .filter(|stored| stored.status == expected)
        else {
            return Ok(None);
        };
        *stored = Claim {
            requesting_user_id: stored.requesting_user_id,
            created_at: stored.created_at,
            updated_at: now,
            ..claim.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: ClaimId) -> Result<bool, ClaimRepositoryError> {
        let mut tables = self.tables.write().await;
        let removed = tables.claims.remove(&id.get()).is_some();
        if removed {
            for request in tables.service_requests.values_mut() {
                if request.claim_id == Some(id) {
                    request.claim_id = None;
                }
            }
        }
        Ok(removed)
    }
}
