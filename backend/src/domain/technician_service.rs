//! Technician directory: profiles with their rating figures.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::policy::{self, Action};
use super::port_call::{PortCall, Reported};
use super::ports::{PasswordHasher, RatingRepository, TechnicianDirectory, TechnicianRepository};
use super::rating_service::aggregate_average;
use super::{
    Actor, Error, NewTechnician, Role, Technician, TechnicianId, TechnicianPatch,
    TechnicianProfile, USER_TEXT_MAX,
};

fn not_found(id: TechnicianId) -> Error {
    Error::not_found(format!("technician {id} not found"))
}

#[derive(Clone)]
pub struct TechnicianService<R: ?Sized> {
    technicians: Arc<R>,
    ratings: Arc<dyn RatingRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R: ?Sized> TechnicianService<R> {
    pub fn new(
        technicians: Arc<R>,
        ratings: Arc<dyn RatingRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            technicians,
            ratings,
            hasher,
        }
    }
}

impl<R> TechnicianService<R>
where
    R: TechnicianRepository + ?Sized,
{
    async fn with_rating(&self, profile: TechnicianProfile) -> Result<Technician, Error> {
        let (average, count) = match self.ratings.aggregate_for(profile.id).await? {
            Some(aggregate) => (aggregate_average(&aggregate, 1), aggregate.total),
            None => (0.0, 0),
        };
        Ok(Technician::from_profile(profile, average, count))
    }

    fn ensure_admin(actor: &Actor) -> Result<(), Error> {
        policy::enforce(
            policy::admin_only(actor, Action::ManageTechnicians),
            Some(actor.user_id()),
        )
    }
}

fn validate_patch(patch: &TechnicianPatch) -> Result<TechnicianPatch, Error> {
    let name = match patch.name.as_deref().map(str::trim) {
        Some("") => return Err(Error::invalid_field("name", "name must not be empty")),
        Some(name) if name.chars().count() > USER_TEXT_MAX => {
            return Err(Error::invalid_field(
                "name",
                format!("name must be at most {USER_TEXT_MAX} characters"),
            ));
        }
        other => other.map(str::to_owned),
    };
    Ok(TechnicianPatch {
        name,
        availability_date: patch.availability_date,
    })
}

#[async_trait]
impl<R> TechnicianDirectory for TechnicianService<R>
where
    R: TechnicianRepository + ?Sized,
{
    async fn list(&self) -> Result<Vec<Technician>, Error> {
        let call = PortCall::new("list_technicians");
        let profiles = self.technicians.list().await.reported(&call)?;
        let aggregates: HashMap<_, _> = self
            .ratings
            .aggregates()
            .await
            .reported(&call)?
            .into_iter()
            .map(|aggregate| (aggregate.technician_id, aggregate))
            .collect();
        Ok(profiles
            .into_iter()
            .map(|profile| match aggregates.get(&profile.id) {
                Some(aggregate) => {
                    Technician::from_profile(profile, aggregate_average(aggregate, 1), aggregate.total)
                }
                None => Technician::from_profile(profile, 0.0, 0),
            })
            .collect())
    }

    async fn show(&self, id: TechnicianId) -> Result<Technician, Error> {
        let call = PortCall::new("show_technician").technician(id);
        let profile = self
            .technicians
            .find(id)
            .await
            .reported(&call)?
            .ok_or_else(|| not_found(id))?;
        self.with_rating(profile).await.reported(&call)
    }

    async fn create(&self, actor: &Actor, technician: NewTechnician) -> Result<Technician, Error> {
        Self::ensure_admin(actor)?;
        let NewTechnician {
            account,
            availability_date,
        } = technician;
        let call = PortCall::new("create_technician").by(actor);
        let hash = self.hasher.hash(account.password()).reported(&call)?;
        let record = account.into_record(Role::Technician, hash);
        let profile = self
            .technicians
            .create(&record, availability_date)
            .await
            .reported(&call)?;
        info!(
            actor_id = actor.user_id().get(),
            technician_id = profile.id.get(),
            "technician created"
        );
        Ok(Technician::from_profile(profile, 0.0, 0))
    }

    async fn update(
        &self,
        actor: &Actor,
        id: TechnicianId,
        patch: TechnicianPatch,
    ) -> Result<Technician, Error> {
        Self::ensure_admin(actor)?;
        let patch = validate_patch(&patch)?;
        let call = PortCall::new("update_technician").by(actor).technician(id);
        let profile = self
            .technicians
            .update(id, &patch)
            .await
            .reported(&call)?
            .ok_or_else(|| not_found(id))?;
        info!(actor_id = actor.user_id().get(), technician_id = id.get(), "technician updated");
        self.with_rating(profile).await.reported(&call)
    }

    async fn delete(&self, actor: &Actor, id: TechnicianId) -> Result<(), Error> {
        Self::ensure_admin(actor)?;
        let call = PortCall::new("delete_technician").by(actor).technician(id);
        if !self.technicians.delete(id).await.reported(&call)? {
            return Err(not_found(id));
        }
        info!(actor_id = actor.user_id().get(), technician_id = id.get(), "technician deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "technician_service_tests.rs"]
mod tests;
