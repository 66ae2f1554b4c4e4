use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Available,
    Blocked,
    TemporaryBlocked,
}

///
/// Availability of the resource.
///
/// `until` exists only in [ResourceState::TemporaryBlocked],
/// so a blocked-until timestamp can't be attached to any other status.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Available,
    Blocked,
    TemporaryBlocked { until: OffsetDateTime },
}

impl ResourceState {
    pub fn from_parts(
        status: ResourceStatus,
        blocked_until: Option<OffsetDateTime>,
    ) -> Result<Self, &'static str> {
        match (status, blocked_until) {
            (ResourceStatus::Available, None) => Ok(Self::Available),
            (ResourceStatus::Blocked, None) => Ok(Self::Blocked),
            (ResourceStatus::TemporaryBlocked, Some(until)) => Ok(Self::TemporaryBlocked { until }),
            (ResourceStatus::TemporaryBlocked, None) => {
                Err("temporary_blocked resource without blocked_until")
            }
            (_, Some(_)) => Err("blocked_until set on resource that is not temporary_blocked"),
        }
    }

    pub fn status(&self) -> ResourceStatus {
        match self {
            Self::Available => ResourceStatus::Available,
            Self::Blocked => ResourceStatus::Blocked,
            Self::TemporaryBlocked { .. } => ResourceStatus::TemporaryBlocked,
        }
    }

    pub fn blocked_until(&self) -> Option<OffsetDateTime> {
        match self {
            Self::TemporaryBlocked { until } => Some(*until),
            _ => None,
        }
    }

    ///
    /// Temporary block is over once `until` is reached
    ///
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self, Self::TemporaryBlocked { until } if *until <= now)
    }

    ///
    /// Checks whether transition from `self` to `target` is allowed.
    /// ```text
    /// Available        -> Blocked | TemporaryBlocked
    /// Blocked          -> Available
    /// TemporaryBlocked -> Available
    /// ```
    ///
    pub fn can_transition_to(&self, target: &ResourceState) -> bool {
        match (self, target) {
            (Self::Available, Self::Blocked | Self::TemporaryBlocked { .. }) => true,
            (Self::Blocked | Self::TemporaryBlocked { .. }, Self::Available) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub state: ResourceState,
}

impl Resource {
    pub fn available(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: ResourceState::Available,
        }
    }
}
