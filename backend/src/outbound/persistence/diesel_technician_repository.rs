//! PostgreSQL-backed `TechnicianRepository`.
//!
//! A technician is a `technicians` row joined with its `users` row. Create
//! and delete touch both tables inside one transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{TechnicianRepository, TechnicianRepositoryError};
use crate::domain::{NewUserRecord, TechnicianId, TechnicianPatch, TechnicianProfile, UserId};

use super::diesel_user_repository::insert_user_row;
use super::error_mapping::DbFailure;
use super::models::{NewTechnicianRow, TechnicianRow, UserRow, technician_profile};
use super::pool::DbPool;
use super::schema::{service_requests, technicians, users};

#[derive(Clone)]
pub struct DieselTechnicianRepository {
    pool: DbPool,
}

impl DieselTechnicianRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_error(failure: impl Into<DbFailure>) -> TechnicianRepositoryError {
    match failure.into() {
        DbFailure::Connection(message) => TechnicianRepositoryError::connection(message),
        other => TechnicianRepositoryError::query(other.message()),
    }
}

/// Failure inside a technician transaction.
enum TxError {
    Db(diesel::result::Error),
    InUse,
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

/// Which column identifies the profile to load.
#[derive(Clone, Copy)]
enum ProfileKey {
    Technician(TechnicianId),
    User(UserId),
}

async fn load_profile(
    conn: &mut AsyncPgConnection,
    key: ProfileKey,
) -> Result<Option<TechnicianProfile>, diesel::result::Error> {
    let query = technicians::table
        .inner_join(users::table)
        .select((TechnicianRow::as_select(), UserRow::as_select()))
        .into_boxed();
    let query = match key {
        ProfileKey::Technician(id) => query.filter(technicians::id.eq(id.get())),
        ProfileKey::User(user_id) => query.filter(technicians::user_id.eq(user_id.get())),
    };
    let row: Option<(TechnicianRow, UserRow)> = query.first(conn).await.optional()?;
    Ok(row.map(|(technician, user)| technician_profile(technician, user)))
}

#[async_trait]
impl TechnicianRepository for DieselTechnicianRepository {
    async fn list(&self) -> Result<Vec<TechnicianProfile>, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows: Vec<(TechnicianRow, UserRow)> = technicians::table
            .inner_join(users::table)
            .select((TechnicianRow::as_select(), UserRow::as_select()))
            .order_by(users::name.asc())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        Ok(rows
            .into_iter()
            .map(|(technician, user)| technician_profile(technician, user))
            .collect())
    }

    async fn find(
        &self,
        id: TechnicianId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        load_profile(&mut conn, ProfileKey::Technician(id)).await.map_err(to_error)
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        load_profile(&mut conn, ProfileKey::User(user_id)).await.map_err(to_error)
    }

    async fn create(
        &self,
        account: &NewUserRecord,
        availability_date: Option<NaiveDate>,
    ) -> Result<TechnicianProfile, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let (technician, user) = conn
            .transaction(|conn| {
                async move {
                    let user = insert_user_row(conn, account).await?;
                    let technician = diesel::insert_into(technicians::table)
                        .values(&NewTechnicianRow {
                            user_id: user.id,
                            availability_date,
                        })
                        .returning(TechnicianRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((technician, user))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match DbFailure::from(err) {
                unique @ DbFailure::UniqueViolation { .. } if unique.constraint_contains("email") => {
                    TechnicianRepositoryError::duplicate_email(account.email.clone())
                }
                other => to_error(other),
            })?;
        Ok(technician_profile(technician, user))
    }

    async fn update(
        &self,
        id: TechnicianId,
        patch: &TechnicianPatch,
    ) -> Result<Option<TechnicianProfile>, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        conn.transaction(|conn| {
            async move {
                let Some(technician) = technicians::table
                    .find(id.get())
                    .select(TechnicianRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                else {
                    return Ok(None);
                };
                if let Some(availability) = patch.availability_date {
                    diesel::update(technicians::table.find(id.get()))
                        .set((
                            technicians::availability_date.eq(availability),
                            technicians::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;
                }
                if let Some(name) = patch.name.as_deref() {
                    diesel::update(users::table.find(technician.user_id))
                        .set((users::name.eq(name), users::updated_at.eq(diesel::dsl::now)))
                        .execute(conn)
                        .await?;
                }
                load_profile(conn, ProfileKey::Technician(id)).await
            }
            .scope_boxed()
        })
        .await
        .map_err(to_error)
    }

    async fn delete(&self, id: TechnicianId) -> Result<bool, TechnicianRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let Some(user_id) = technicians::table
                        .find(id.get())
                        .select(technicians::user_id)
                        .for_update()
                        .first::<i64>(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(false);
                    };
                    let referenced: bool = diesel::select(diesel::dsl::exists(
                        service_requests::table
                            .filter(service_requests::technician_id.eq(id.get())),
                    ))
                    .get_result(conn)
                    .await?;
                    if referenced {
                        return Err(TxError::InUse);
                    }
                    // Ratings cascade with the profile; the profile cascades
                    // with its account.
                    diesel::delete(users::table.find(user_id))
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(deleted) => Ok(deleted),
            Err(TxError::InUse) => Err(TechnicianRepositoryError::in_use(id.get())),
            Err(TxError::Db(error)) => match DbFailure::from(error) {
                fk @ DbFailure::ForeignKeyViolation { .. } if fk.constraint_contains("technician") => {
                    Err(TechnicianRepositoryError::in_use(id.get()))
                }
                other => Err(to_error(other)),
            },
        }
    }
}
