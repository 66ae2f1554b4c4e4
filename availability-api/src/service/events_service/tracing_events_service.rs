use super::{EventsService, ResourceEvent};
use axum::async_trait;

///
/// Writes events to the log. Used when no message broker is configured.
///
pub struct TracingEventsService;

#[async_trait]
impl EventsService for TracingEventsService {
    async fn publish(&self, event: ResourceEvent) -> anyhow::Result<()> {
        tracing::info!(event_type = event.as_ref(), id = event.id(), "resource event");

        Ok(())
    }
}
