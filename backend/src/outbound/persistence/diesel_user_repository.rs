//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{BootstrapOutcome, UserRepository, UserRepositoryError};
use crate::domain::{NewUserRecord, Role, StoredCredentials, UserAccount, UserId};

use super::error_mapping::DbFailure;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Advisory lock key serialising the first-admin bootstrap.
const BOOTSTRAP_LOCK_KEY: i64 = 0x6469_7370_6164_6d;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(super) fn map_user_failure(failure: DbFailure, email: Option<&str>) -> UserRepositoryError {
    match failure {
        DbFailure::Connection(message) => UserRepositoryError::connection(message),
        ref unique @ DbFailure::UniqueViolation { .. } if unique.constraint_contains("email") => {
            UserRepositoryError::duplicate_email(email.unwrap_or_default())
        }
        other => UserRepositoryError::query(other.message()),
    }
}

fn to_error(failure: impl Into<DbFailure>) -> UserRepositoryError {
    map_user_failure(failure.into(), None)
}

/// Insert a user row on an existing connection.
pub(super) async fn insert_user_row(
    conn: &mut AsyncPgConnection,
    record: &NewUserRecord,
) -> Result<UserRow, diesel::result::Error> {
    diesel::insert_into(users::table)
        .values(&NewUserRow::from_record(record))
        .returning(UserRow::as_returning())
        .get_result(conn)
        .await
}

async fn admin_exists_on(conn: &mut AsyncPgConnection) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        users::table.filter(users::role.eq(Role::Admin.as_str())),
    ))
    .get_result(conn)
    .await
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserAccount, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row = insert_user_row(&mut conn, record)
            .await
            .map_err(|err| map_user_failure(err.into(), Some(&record.email)))?;
        row.into_account().map_err(to_error)
    }

    async fn find(&self, id: UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        row.map(UserRow::into_account).transpose().map_err(to_error)
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        row.map(|row| {
            let password_hash = row.password_hash.clone();
            row.into_account().map(|account| StoredCredentials {
                account,
                password_hash,
            })
        })
        .transpose()
        .map_err(to_error)
    }

    async fn admin_exists(&self) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        admin_exists_on(&mut conn).await.map_err(to_error)
    }

    async fn insert_bootstrap_admin(
        &self,
        record: &NewUserRecord,
    ) -> Result<BootstrapOutcome, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let inserted: Option<UserRow> = conn
            .transaction(|conn| {
                async move {
                    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
                        .bind::<diesel::sql_types::BigInt, _>(BOOTSTRAP_LOCK_KEY)
                        .execute(conn)
                        .await?;
                    if admin_exists_on(conn).await? {
                        return Ok(None);
                    }
                    insert_user_row(conn, record).await.map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err: diesel::result::Error| map_user_failure(err.into(), Some(&record.email)))?;

        match inserted {
            Some(row) => row
                .into_account()
                .map(BootstrapOutcome::Created)
                .map_err(to_error),
            None => Ok(BootstrapOutcome::AdminExists),
        }
    }
}
