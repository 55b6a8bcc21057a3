use async_trait::async_trait;

use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{Category, CategoryId};

use super::MemoryStore;

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, CategoryRepositoryError> {
        Ok(self.tables.read().await.categories.get(&id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }
}
