//! Technician profiles joined with their user accounts.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ports::{TechnicianRepository, TechnicianRepositoryError, UserRepositoryError};
use crate::domain::{NewUserRecord, TechnicianId, TechnicianPatch, TechnicianProfile, UserId};

use super::{MemoryStore, TechnicianRow};

#[async_trait]
impl TechnicianRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<TechnicianProfile>, TechnicianRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .technicians
            .values()
            .filter_map(|row| tables.profile(row))
            .collect())
    }

    async fn find(
        &self,
        id: TechnicianId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .technicians
            .get(&id.get())
            .and_then(|row| tables.profile(row)))
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .technicians
            .values()
            .find(|row| row.user_id == user_id)
            .and_then(|row| tables.profile(row)))
    }

    async fn create(
        &self,
        account: &NewUserRecord,
        availability_date: Option<NaiveDate>,
    ) -> Result<TechnicianProfile, TechnicianRepositoryError> {
        let mut tables = self.tables.write().await;
        let user = Self::insert_user(&mut tables, account, self.now()).map_err(|err| match err {
            UserRepositoryError::DuplicateEmail { email } => {
                TechnicianRepositoryError::duplicate_email(email)
            }
            other => TechnicianRepositoryError::query(other.to_string()),
        })?;
        let id = tables.next_id();
        let row = TechnicianRow {
            id: TechnicianId::new(id),
            user_id: user.id,
            availability_date,
        };
        tables.technicians.insert(id, row.clone());
        tables
            .profile(&row)
            .ok_or_else(|| TechnicianRepositoryError::query("technician account vanished"))
    }

    async fn update(
        &self,
        id: TechnicianId,
        patch: &TechnicianPatch,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.technicians.get_mut(&id.get()) else {
            return Ok(None);
        };
        if let Some(availability) = patch.availability_date {
            row.availability_date = availability;
        }
        let row = row.clone();
        if let Some(name) = &patch.name {
            if let Some(user) = tables.users.get_mut(&row.user_id.get()) {
                user.account.name.clone_from(name);
            }
        }
        Ok(tables.profile(&row))
    }

    async fn delete(&self, id: TechnicianId) -> Result<bool, TechnicianRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .service_requests
            .values()
            .any(|request| request.technician_id == Some(id))
        {
            return Err(TechnicianRepositoryError::in_use(id.get()));
        }
        let Some(row) = tables.technicians.remove(&id.get()) else {
            return Ok(false);
        };
        tables.users.remove(&row.user_id.get());
        tables
            .ratings
            .retain(|_, rating| rating.technician_id != id);
        Ok(true)
    }
}
