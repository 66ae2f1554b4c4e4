use strum::AsRefStr;

///
/// Notification about resource availability change.
/// [AsRef<str>] returns event type name, e.g. `ResourceBlocked`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum ResourceEvent {
    ResourceBlocked { id: i64 },
    ResourceUnblocked { id: i64 },
}

impl ResourceEvent {
    pub fn id(&self) -> i64 {
        match self {
            Self::ResourceBlocked { id } => *id,
            Self::ResourceUnblocked { id } => *id,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn event_type() {
        assert_eq!(
            ResourceEvent::ResourceBlocked { id: 1 }.as_ref(),
            "ResourceBlocked"
        );
        assert_eq!(
            ResourceEvent::ResourceUnblocked { id: 1 }.as_ref(),
            "ResourceUnblocked"
        );
    }
}
