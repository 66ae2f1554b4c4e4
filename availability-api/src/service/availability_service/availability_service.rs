use crate::{dto::input, error::Error, repository::Resource};
use axum::async_trait;
use time::OffsetDateTime;

///
/// Owns availability of resources.
///
/// Every operation first lifts temporary block of the resource
/// if its `until` is already reached. Lifting a block publishes
/// `ResourceUnblocked` event.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    ///
    /// Find resource by id
    ///
    /// ### Errors
    /// - [Error::ResourceNotExist] when resource does not exist
    ///
    async fn find_resource(&self, id: i64) -> Result<Resource, Error>;

    ///
    /// Find all resources or only resources matching the filter.
    /// Resources are sorted ascending by id.
    ///
    async fn find_resources(
        &self,
        filter: Option<input::ResourceFilter>,
    ) -> Result<Vec<Resource>, Error>;

    ///
    /// Block available resource without time limit.
    ///
    /// ### Errors
    /// - [Error::ResourceNotExist] when resource does not exist
    /// - [Error::ResourceConflict] when resource is not available
    ///
    async fn block_resource(&self, id: i64) -> Result<Resource, Error>;

    ///
    /// Block available resource until given time.
    ///
    /// ### Errors
    /// - [Error::Validation] when `until` already passed
    /// - [Error::ResourceNotExist] when resource does not exist
    /// - [Error::ResourceConflict] when resource is not available
    ///
    async fn temporary_block_resource(
        &self,
        id: i64,
        until: OffsetDateTime,
    ) -> Result<Resource, Error>;

    ///
    /// Make blocked or temporary blocked resource available again.
    ///
    /// ### Errors
    /// - [Error::ResourceNotExist] when resource does not exist
    /// - [Error::ResourceConflict] when resource is already available
    ///
    async fn unblock_resource(&self, id: i64) -> Result<Resource, Error>;
}
