//! Driving port for the technician directory.

use async_trait::async_trait;

use crate::domain::{Actor, Error, NewTechnician, Technician, TechnicianId, TechnicianPatch};

#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Technician>, Error>;

    async fn show(&self, id: TechnicianId) -> Result<Technician, Error>;

    async fn create(&self, actor: &Actor, technician: NewTechnician) -> Result<Technician, Error>;

    async fn update(
        &self,
        actor: &Actor,
        id: TechnicianId,
        patch: TechnicianPatch,
    ) -> Result<Technician, Error>;

    async fn delete(&self, actor: &Actor, id: TechnicianId) -> Result<(), Error>;
}
