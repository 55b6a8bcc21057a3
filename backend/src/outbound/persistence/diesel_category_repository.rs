//! PostgreSQL-backed `CategoryRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{Category, CategoryId};

use super::error_mapping::DbFailure;
use super::models::CategoryRow;
use super::pool::DbPool;
use super::schema::categories;

#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_error(failure: impl Into<DbFailure>) -> CategoryRepositoryError {
    match failure.into() {
        DbFailure::Connection(message) => CategoryRepositoryError::connection(message),
        other => CategoryRepositoryError::query(other.message()),
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let row: Option<CategoryRow> = categories::table
            .find(id.get())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(to_error)?;
        Ok(row.map(Category::from))
    }

    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(to_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .order(categories::id.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(to_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}
