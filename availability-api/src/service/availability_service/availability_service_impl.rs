use super::AvailabilityService;
use crate::{
    clock::Clock,
    dto::input,
    error::Error,
    repository::{self, Resource, ResourceState, ResourceStatus, ResourcesRepository},
    service::events_service::{EventsService, ResourceEvent},
};
use axum::async_trait;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset};

pub struct AvailabilityServiceImpl {
    repository: Arc<dyn ResourcesRepository>,
    events_service: Arc<dyn EventsService>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityServiceImpl {
    pub fn new(
        repository: Arc<dyn ResourcesRepository>,
        events_service: Arc<dyn EventsService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            events_service,
            clock,
        }
    }

    ///
    /// Converts `until` to UTC with millisecond precision, the form it is stored
    /// and rendered in. RFC3339 has four digit years, so UTC year must stay within 0..=9999.
    ///
    fn normalize_until(until: OffsetDateTime) -> Result<OffsetDateTime, Error> {
        let until = until
            .checked_to_offset(UtcOffset::UTC)
            .filter(|until| (0..=9999).contains(&until.year()))
            .ok_or(Error::Validation("until out of range"))?;

        Ok(until.replace_millisecond(until.millisecond()).unwrap_or(until))
    }

    fn validate_until_not_passed(&self, until: &OffsetDateTime) -> Result<(), Error> {
        if *until <= self.clock.now() {
            return Err(Error::Validation("until already passed"));
        }

        Ok(())
    }

    async fn find_current(&self, id: i64) -> Result<Resource, Error> {
        let resource = self
            .repository
            .find(id)
            .await?
            .ok_or(Error::ResourceNotExist(id))?;

        self.lift_expired_block(resource)
            .await?
            .ok_or(Error::ResourceNotExist(id))
    }

    ///
    /// Makes resource available if its temporary block expired.
    /// Only the caller that succeeded to update the state publishes `ResourceUnblocked`,
    /// others read the resource again.
    ///
    /// Returns [None] when resource disappeared in the meantime.
    ///
    async fn lift_expired_block(&self, mut resource: Resource) -> Result<Option<Resource>, Error> {
        while resource.state.is_expired(self.clock.now()) {
            let update_result = self
                .repository
                .update_state(resource.id, resource.state, ResourceState::Available)
                .await;

            match update_result {
                Ok(()) => {
                    tracing::info!(id = resource.id, "temporary block expired");
                    self.publish(ResourceEvent::ResourceUnblocked { id: resource.id })
                        .await;

                    resource.state = ResourceState::Available;
                }
                Err(repository::Error::NoDocumentUpdated) => {
                    tracing::debug!(id = resource.id, "resource changed concurrently");

                    match self.repository.find(resource.id).await? {
                        Some(found) => resource = found,
                        None => return Ok(None),
                    }
                }
                Err(err) => return Err(Error::Database(err)),
            }
        }

        Ok(Some(resource))
    }

    ///
    /// Moves resource to `target` state.
    /// Lost compare-and-swap is retried with freshly read state,
    /// so concurrent transitions end as [Error::ResourceConflict].
    ///
    async fn transition(&self, id: i64, target: ResourceState) -> Result<Resource, Error> {
        loop {
            let mut resource = self.find_current(id).await?;
            if !resource.state.can_transition_to(&target) {
                return Err(Error::ResourceConflict {
                    id,
                    status: resource.state.status(),
                });
            }

            let update_result = self
                .repository
                .update_state(id, resource.state, target)
                .await;

            match update_result {
                Ok(()) => {
                    resource.state = target;
                    return Ok(resource);
                }
                Err(repository::Error::NoDocumentUpdated) => {
                    tracing::debug!(id, "resource changed concurrently");
                }
                Err(err) => return Err(Error::Database(err)),
            }
        }
    }

    async fn publish(&self, event: ResourceEvent) {
        if let Err(err) = self.events_service.publish(event).await {
            tracing::warn!(
                event_type = event.as_ref(),
                id = event.id(),
                %err,
                "failed to publish event"
            );
        }
    }
}

#[async_trait]
impl AvailabilityService for AvailabilityServiceImpl {
    async fn find_resource(&self, id: i64) -> Result<Resource, Error> {
        tracing::info!(id, "finding resource");

        let resource = self.find_current(id).await?;

        tracing::info!(id, status = %resource.state.status(), "found resource");

        Ok(resource)
    }

    async fn find_resources(
        &self,
        filter: Option<input::ResourceFilter>,
    ) -> Result<Vec<Resource>, Error> {
        tracing::info!(?filter, "finding resources");

        let status = filter.map(ResourceStatus::from);

        // Expiry is resolved for all resources, not only for the filtered ones
        let found = self.repository.find_many(None).await?;
        let mut resources = Vec::with_capacity(found.len());
        for resource in found {
            let Some(resource) = self.lift_expired_block(resource).await? else {
                continue;
            };
            if status.map_or(true, |status| resource.state.status() == status) {
                resources.push(resource);
            }
        }

        tracing::info!(count = resources.len(), "found resources");

        Ok(resources)
    }

    async fn block_resource(&self, id: i64) -> Result<Resource, Error> {
        tracing::info!(id, "blocking resource");

        let resource = self.transition(id, ResourceState::Blocked).await?;

        tracing::info!(id, "blocked resource");
        self.publish(ResourceEvent::ResourceBlocked { id }).await;

        Ok(resource)
    }

    async fn temporary_block_resource(
        &self,
        id: i64,
        until: OffsetDateTime,
    ) -> Result<Resource, Error> {
        tracing::info!(id, %until, "temporary blocking resource");

        let until = Self::normalize_until(until)?;
        self.validate_until_not_passed(&until)?;

        let resource = self
            .transition(id, ResourceState::TemporaryBlocked { until })
            .await?;

        tracing::info!(id, "temporary blocked resource");
        self.publish(ResourceEvent::ResourceBlocked { id }).await;

        Ok(resource)
    }

    async fn unblock_resource(&self, id: i64) -> Result<Resource, Error> {
        tracing::info!(id, "unblocking resource");

        let resource = self.transition(id, ResourceState::Available).await?;

        tracing::info!(id, "unblocked resource");
        self.publish(ResourceEvent::ResourceUnblocked { id }).await;

        Ok(resource)
    }
}
