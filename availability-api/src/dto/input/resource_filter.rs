use crate::repository::ResourceStatus;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFilter {
    Blocked,
    TemporaryBlocked,
}

impl From<ResourceFilter> for ResourceStatus {
    fn from(value: ResourceFilter) -> Self {
        match value {
            ResourceFilter::Blocked => ResourceStatus::Blocked,
            ResourceFilter::TemporaryBlocked => ResourceStatus::TemporaryBlocked,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResourcesQuery {
    pub status: Option<ResourceFilter>,
}
