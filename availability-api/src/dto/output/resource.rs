use crate::repository::{self, ResourceStatus};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub status: ResourceStatus,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub blocked_until: Option<OffsetDateTime>,
}

impl From<repository::Resource> for Resource {
    fn from(value: repository::Resource) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.state.status(),
            blocked_until: value.state.blocked_until(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Resources {
    pub resources: Vec<Resource>,
}
