use super::ResourceEvent;
use axum::async_trait;

///
/// Service used to propagate resource availability changes to any interested party
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsService: Send + Sync {
    ///
    /// Schedules event to be delivered at least once.
    /// Delivery is not confirmed to the caller.
    ///
    /// ### Errors
    /// Returns an error when event could not be scheduled
    ///
    async fn publish(&self, event: ResourceEvent) -> anyhow::Result<()>;
}
