use crate::repository::{Error, Resource, ResourceState, ResourceStatus};
use bson::DateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Serialize, Deserialize)]
pub struct ResourceEntity {
    pub _id: i64,

    pub name: String,

    pub status: String,
    pub blocked_until: Option<DateTime>,
}

impl From<&Resource> for ResourceEntity {
    fn from(value: &Resource) -> Self {
        Self {
            _id: value.id,
            name: value.name.clone(),
            status: value.state.status().as_ref().to_string(),
            blocked_until: value.state.blocked_until().map(DateTime::from),
        }
    }
}

impl TryFrom<ResourceEntity> for Resource {
    type Error = Error;

    fn try_from(value: ResourceEntity) -> Result<Self, Self::Error> {
        let status = ResourceStatus::from_str(&value.status).map_err(|err| {
            Error::InvalidDocument(format!("resource {}: invalid status: {err}", value._id))
        })?;
        let blocked_until = value.blocked_until.map(OffsetDateTime::from);
        let state = ResourceState::from_parts(status, blocked_until)
            .map_err(|err| Error::InvalidDocument(format!("resource {}: {err}", value._id)))?;

        Ok(Self {
            id: value._id,
            name: value.name,
            state,
        })
    }
}
