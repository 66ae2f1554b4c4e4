use super::{Error, Resource, ResourceState, ResourceStatus, ResourcesRepository};
use axum::async_trait;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

///
/// Repository that keeps resources in process memory.
///
/// Every resource has its own lock. The map lock is taken for writing
/// only when a new resource is inserted, so updates of different resources
/// never wait for each other.
///
pub struct InMemoryResourcesRepository {
    resources: RwLock<BTreeMap<i64, Arc<Mutex<Resource>>>>,
}

impl InMemoryResourcesRepository {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(BTreeMap::new()),
        }
    }

    async fn entry(&self, id: i64) -> Option<Arc<Mutex<Resource>>> {
        self.resources.read().await.get(&id).cloned()
    }
}

impl Default for InMemoryResourcesRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourcesRepository for InMemoryResourcesRepository {
    async fn insert(&self, resource: &Resource) -> Result<(), Error> {
        let mut resources = self.resources.write().await;
        if resources.contains_key(&resource.id) {
            return Err(Error::InsertUniqueViolation);
        }

        resources.insert(resource.id, Arc::new(Mutex::new(resource.clone())));

        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Option<Resource>, Error> {
        let Some(entry) = self.entry(id).await else {
            return Ok(None);
        };

        let resource = entry.lock().await.clone();

        Ok(Some(resource))
    }

    async fn find_many(&self, status: Option<ResourceStatus>) -> Result<Vec<Resource>, Error> {
        // Entries are locked one by one, so result is not a point-in-time snapshot
        let entries = self
            .resources
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();

        let mut resources = Vec::with_capacity(entries.len());
        for entry in entries {
            let resource = entry.lock().await;
            if status.map_or(true, |status| resource.state.status() == status) {
                resources.push(resource.clone());
            }
        }

        Ok(resources)
    }

    async fn update_state(
        &self,
        id: i64,
        expected: ResourceState,
        new: ResourceState,
    ) -> Result<(), Error> {
        let entry = self.entry(id).await.ok_or(Error::NoDocumentUpdated)?;

        let mut resource = entry.lock().await;
        if resource.state != expected {
            return Err(Error::NoDocumentUpdated);
        }
        resource.state = new;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    async fn repository_with(resources: &[Resource]) -> InMemoryResourcesRepository {
        let repository = InMemoryResourcesRepository::new();
        for resource in resources {
            repository.insert(resource).await.unwrap();
        }

        repository
    }

    #[tokio::test]
    async fn insert_unique_id() {
        let repository = repository_with(&[Resource::available(1, "LadyGaGa")]).await;

        let err = repository
            .insert(&Resource::available(1, "T-Love"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsertUniqueViolation));
    }

    #[tokio::test]
    async fn find_exist() {
        let repository = repository_with(&[Resource::available(1, "LadyGaGa")]).await;

        let resource = repository.find(1).await.unwrap();

        assert_eq!(resource, Some(Resource::available(1, "LadyGaGa")));
    }

    #[tokio::test]
    async fn find_not_exist() {
        let repository = repository_with(&[Resource::available(1, "LadyGaGa")]).await;

        let resource = repository.find(2).await.unwrap();

        assert!(resource.is_none());
    }

    #[tokio::test]
    async fn find_many_sorted_by_id() {
        let repository = repository_with(&[
            Resource::available(3, "Snoop Dog"),
            Resource::available(1, "LadyGaGa"),
            Resource::available(2, "T-Love"),
        ])
        .await;

        let resources = repository.find_many(None).await.unwrap();

        let ids = resources.iter().map(|resource| resource.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn find_many_filtered_by_status() {
        let until = datetime!(2030-01-01 00:00 UTC);
        let repository = repository_with(&[
            Resource::available(1, "LadyGaGa"),
            Resource {
                id: 2,
                name: "T-Love".to_string(),
                state: ResourceState::Blocked,
            },
            Resource {
                id: 3,
                name: "Snoop Dog".to_string(),
                state: ResourceState::TemporaryBlocked { until },
            },
        ])
        .await;

        let blocked = repository
            .find_many(Some(ResourceStatus::Blocked))
            .await
            .unwrap();
        let temporary_blocked = repository
            .find_many(Some(ResourceStatus::TemporaryBlocked))
            .await
            .unwrap();

        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].id, 2);
        assert_eq!(temporary_blocked.len(), 1);
        assert_eq!(temporary_blocked[0].id, 3);
    }

    #[tokio::test]
    async fn update_state_value_changed() {
        let repository = repository_with(&[Resource::available(1, "LadyGaGa")]).await;

        repository
            .update_state(1, ResourceState::Available, ResourceState::Blocked)
            .await
            .unwrap();

        let resource = repository.find(1).await.unwrap().unwrap();
        assert_eq!(resource.state, ResourceState::Blocked);
    }

    #[tokio::test]
    async fn update_state_expected_state_mismatch() {
        let repository = repository_with(&[Resource::available(1, "LadyGaGa")]).await;

        let err = repository
            .update_state(1, ResourceState::Blocked, ResourceState::Available)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));
    }

    #[tokio::test]
    async fn update_state_expected_until_mismatch() {
        let resource = Resource {
            id: 1,
            name: "LadyGaGa".to_string(),
            state: ResourceState::TemporaryBlocked {
                until: datetime!(2030-01-01 00:00 UTC),
            },
        };
        let repository = repository_with(&[resource]).await;

        let err = repository
            .update_state(
                1,
                ResourceState::TemporaryBlocked {
                    until: datetime!(2030-01-02 00:00 UTC),
                },
                ResourceState::Available,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));
    }

    #[tokio::test]
    async fn update_state_not_exist() {
        let repository = InMemoryResourcesRepository::new();

        let err = repository
            .update_state(1, ResourceState::Available, ResourceState::Blocked)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));
    }
}
