//! Port for category reference lookups and the category catalog.

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, Error};

use super::define_port_error;

define_port_error! {
    /// Errors raised by category repository adapters.
    pub enum CategoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "category repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "category repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, CategoryRepositoryError>;

    /// Every category, ordered by id.
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError>;
}

/// Driving port for the public category listing.
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, Error>;
}
