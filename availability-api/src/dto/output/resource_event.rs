use crate::service::events_service::ResourceEvent;
use serde::Serialize;

///
/// Body of the message published for every [ResourceEvent].
/// Event type travels in message metadata.
///
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEventPayload {
    pub id: i64,
}

impl From<&ResourceEvent> for ResourceEventPayload {
    fn from(value: &ResourceEvent) -> Self {
        Self { id: value.id() }
    }
}
