//! Claim workflow.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;

use super::policy::{self, Action};
use super::port_call::{PortCall, Reported};
use super::ports::{ClaimCommand, ClaimQuery, ClaimRepository};
use super::{
    Actor, CategoryId, Claim, ClaimFilter, ClaimId, ClaimPatch, ClaimRelation, ClaimStats,
    ClaimStatus, ClaimView, Error, IncludeSet, NewClaim, RelationLoader, normalise_answer,
};

fn not_found(id: ClaimId) -> Error {
    Error::not_found(format!("claim {id} not found"))
}

fn invalid_transition(from: ClaimStatus, to: ClaimStatus) -> Error {
    Error::invalid_transition(format!("cannot move claim from {from} to {to}"))
        .with_details(json!({ "from": from.as_str(), "to": to.as_str() }))
}

/// Claim workflow service implementing the claim driving ports.
#[derive(Clone)]
pub struct ClaimService<R: ?Sized> {
    claims: Arc<R>,
    relations: RelationLoader,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> ClaimService<R> {
    pub fn new(claims: Arc<R>, relations: RelationLoader, clock: Arc<dyn Clock>) -> Self {
        Self {
            claims,
            relations,
            clock,
        }
    }
}

impl<R> ClaimService<R>
where
    R: ClaimRepository + ?Sized,
{
    async fn load(&self, id: ClaimId) -> Result<Claim, Error> {
        self.claims.find(id).await?.ok_or_else(|| not_found(id))
    }

    /// Explain a conditional write that matched no row.
    async fn stale_write(&self, id: ClaimId, attempted: ClaimStatus, call: &PortCall) -> Error {
        match self.load(id).await {
            Ok(current) => invalid_transition(current.status, attempted),
            Err(error) => call.report(error),
        }
    }
}

#[async_trait]
impl<R> ClaimCommand for ClaimService<R>
where
    R: ClaimRepository + ?Sized,
{
    async fn create(
        &self,
        actor: &Actor,
        category_id: CategoryId,
        subject: &str,
        description: &str,
    ) -> Result<Claim, Error> {
        policy::enforce(policy::create_claim(actor), Some(actor.user_id()))?;
        let new_claim = NewClaim::try_new(actor.user_id(), category_id, subject, description)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let call = PortCall::new("create_claim").by(actor);
        if !self
            .relations
            .category_exists(category_id)
            .await
            .reported(&call)?
        {
            return Err(Error::invalid_field(
                "categoryId",
                format!("category {category_id} does not exist"),
            ));
        }

        let claim = self.claims.insert(&new_claim).await.reported(&call)?;
        info!(
            actor_id = actor.user_id().get(),
            claim_id = claim.id.get(),
            status = claim.status.as_str(),
            "claim created"
        );
        Ok(claim)
    }

    async fn answer(
        &self,
        actor: &Actor,
        id: ClaimId,
        answer: Option<String>,
    ) -> Result<Claim, Error> {
        policy::enforce(
            policy::admin_only(actor, Action::MutateClaim),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("answer_claim").by(actor).claim(id);
        let current = self.load(id).await.reported(&call)?;
        if !current.status.can_transition_to(ClaimStatus::Answered) {
            return Err(invalid_transition(current.status, ClaimStatus::Answered));
        }

        let answered_at = self.clock.utc();
        let Some(claim) = self
            .claims
            .answer(id, normalise_answer(answer), answered_at)
            .await
            .reported(&call)?
        else {
            return Err(self.stale_write(id, ClaimStatus::Answered, &call).await);
        };
        info!(
            actor_id = actor.user_id().get(),
            claim_id = id.get(),
            status = claim.status.as_str(),
            "claim answered"
        );
        Ok(claim)
    }

    async fn update(&self, actor: &Actor, id: ClaimId, patch: ClaimPatch) -> Result<Claim, Error> {
        policy::enforce(
            policy::admin_only(actor, Action::MutateClaim),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("update_claim").by(actor).claim(id);
        let current = self.load(id).await.reported(&call)?;
        if let Some(status) = patch.status {
            if status != current.status && !current.status.can_transition_to(status) {
                return Err(invalid_transition(current.status, status));
            }
        }
        if let Some(category_id) = patch.category_id {
            if category_id != current.category_id
                && !self
                    .relations
                    .category_exists(category_id)
                    .await
                    .reported(&call)?
            {
                return Err(Error::invalid_field(
                    "categoryId",
                    format!("category {category_id} does not exist"),
                ));
            }
        }

        let next = patch
            .apply_to(&current, self.clock.utc())
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let Some(claim) = self
            .claims
            .replace(&next, current.status)
            .await
            .reported(&call)?
        else {
            return Err(self.stale_write(id, next.status, &call).await);
        };
        info!(
            actor_id = actor.user_id().get(),
            claim_id = id.get(),
            status = claim.status.as_str(),
            "claim updated"
        );
        Ok(claim)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: ClaimId,
        status: ClaimStatus,
    ) -> Result<Claim, Error> {
        let patch = ClaimPatch {
            status: Some(status),
            ..ClaimPatch::default()
        };
        self.update(actor, id, patch).await
    }

    async fn delete(&self, actor: &Actor, id: ClaimId) -> Result<(), Error> {
        policy::enforce(
            policy::admin_only(actor, Action::MutateClaim),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("delete_claim").by(actor).claim(id);
        if !self.claims.delete(id).await.reported(&call)? {
            return Err(not_found(id));
        }
        info!(actor_id = actor.user_id().get(), claim_id = id.get(), "claim deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> ClaimQuery for ClaimService<R>
where
    R: ClaimRepository + ?Sized,
{
    async fn list_own(
        &self,
        actor: &Actor,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<Vec<ClaimView>, Error> {
        let call = PortCall::new("list_own_claims").by(actor);
        let claims = self
            .claims
            .list_by_owner(actor.user_id())
            .await
            .reported(&call)?;
        self.relations
            .expand_claims(claims, include)
            .await
            .reported(&call)
    }

    async fn list_all(
        &self,
        actor: &Actor,
        filter: &ClaimFilter,
        page: PageRequest,
        include: &IncludeSet<ClaimRelation>,
    ) -> Result<Page<ClaimView>, Error> {
        policy::enforce(
            policy::admin_only(actor, Action::ViewAnyClaims),
            Some(actor.user_id()),
        )?;
        let call = PortCall::new("list_claims").by(actor);
        let (claims, total) = self.claims.list_page(filter, page).await.reported(&call)?;
        let data = self
            .relations
            .expand_claims(claims, include)
            .await
            .reported(&call)?;
        Ok(Page::new(data, total, page))
    }

    async fn stats(&self, actor: &Actor) -> Result<ClaimStats, Error> {
        policy::enforce(
            policy::admin_only(actor, Action::ViewAnyClaims),
            Some(actor.user_id()),
        )?;
        self.claims
            .stats()
            .await
            .reported(&PortCall::new("claim_stats").by(actor))
    }
}

#[cfg(test)]
#[path = "claim_service_tests.rs"]
mod tests;
