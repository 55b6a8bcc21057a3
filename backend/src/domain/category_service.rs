//! Category catalog listing.

use std::sync::Arc;

use async_trait::async_trait;

use super::port_call::{PortCall, Reported};
use super::ports::{CategoryCatalog, CategoryRepository};
use super::{Category, Error};

#[derive(Clone)]
pub struct CategoryService<R: ?Sized> {
    categories: Arc<R>,
}

impl<R: ?Sized> CategoryService<R> {
    pub fn new(categories: Arc<R>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl<R> CategoryCatalog for CategoryService<R>
where
    R: CategoryRepository + ?Sized,
{
    async fn list(&self) -> Result<Vec<Category>, Error> {
        self.categories
            .list()
            .await
            .reported(&PortCall::new("list_categories"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{CategoryRepositoryError, MockCategoryRepository};
    use crate::domain::{CategoryId, ErrorCode};

    #[rstest]
    #[tokio::test]
    async fn lists_what_the_repository_holds() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_list().times(1).return_once(|| {
            Ok(vec![
                Category {
                    id: CategoryId::new(1),
                    name: "Plumbing".into(),
                },
                Category {
                    id: CategoryId::new(2),
                    name: "Electrical".into(),
                },
            ])
        });

        let listed = CategoryService::new(Arc::new(repo))
            .list()
            .await
            .expect("list");

        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Plumbing", "Electrical"]);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_surface_as_unavailable() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_list()
            .return_once(|| Err(CategoryRepositoryError::connection("refused")));

        let err = CategoryService::new(Arc::new(repo))
            .list()
            .await
            .expect_err("port failure");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
