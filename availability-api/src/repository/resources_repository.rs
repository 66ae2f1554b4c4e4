use super::{Error, Resource, ResourceState, ResourceStatus};
use axum::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourcesRepository: Send + Sync {
    ///
    /// Inserts new resource.
    ///
    /// ### Errors
    /// - [Error::InsertUniqueViolation] when resource with the same id already exists
    ///
    async fn insert(&self, resource: &Resource) -> Result<(), Error>;

    ///
    /// Finds resource by id
    ///
    async fn find(&self, id: i64) -> Result<Option<Resource>, Error>;

    ///
    /// Finds all resources, or only resources with `status` when provided.
    /// Resources are sorted ascending by id.
    ///
    async fn find_many(&self, status: Option<ResourceStatus>) -> Result<Vec<Resource>, Error>;

    ///
    /// Atomically replaces state of the resource,
    /// but only if its current state is equal to `expected`.
    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when
    ///     - resource does not exist
    ///     - current state of the resource is different than `expected`
    ///
    async fn update_state(
        &self,
        id: i64,
        expected: ResourceState,
        new: ResourceState,
    ) -> Result<(), Error>;
}
