use super::{
    entity::ResourceEntity, Error, Resource, ResourceState, ResourceStatus, ResourcesRepository,
};
use axum::async_trait;
use bson::{doc, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Database, IndexModel,
};
use std::{future::Future, time::Duration};

const RESOURCES: &str = "resources";
const INDEX_NAME_STATUS: &str = "status";

///
/// Durable repository backed by MongoDB.
///
/// Each call is bounded by `timeout` and fails with [Error::Timeout]
/// when database does not answer in time.
///
pub struct MongoResourcesRepository {
    database: Database,
    timeout: Duration,
}

impl MongoResourcesRepository {
    pub async fn new(database: Database, timeout: Duration) -> Result<Self, mongodb::error::Error> {
        tracing::debug!("fetching collection names");
        let collection_names = database.list_collection_names().await?;

        if !collection_names.iter().any(|name| name == RESOURCES) {
            tracing::debug!(collection = RESOURCES, "creating collection");
            database.create_collection(RESOURCES).await?;
        }

        let collection = database.collection::<Document>(RESOURCES);

        tracing::debug!("fetching index names");
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_STATUS.to_string()) {
            collection
                .create_index(
                    IndexModel::builder()
                        .keys(doc! {
                            "status": 1,
                            "_id": 1,
                        })
                        .options(
                            IndexOptions::builder()
                                .name(INDEX_NAME_STATUS.to_string())
                                .build(),
                        )
                        .build(),
                )
                .await?;
            tracing::debug!(
                collection = RESOURCES,
                index = INDEX_NAME_STATUS,
                "created index"
            );
        }

        Ok(Self { database, timeout })
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "database operation timed out");
                Err(Error::Timeout)
            }
        }
    }
}

#[async_trait]
impl ResourcesRepository for MongoResourcesRepository {
    async fn insert(&self, resource: &Resource) -> Result<(), Error> {
        let insert_entity = ResourceEntity::from(resource);

        self.bounded(async {
            self.database
                .collection::<ResourceEntity>(RESOURCES)
                .insert_one(insert_entity)
                .await
                .map_err(|err| {
                    let ErrorKind::Write(ref write_failure) = *err.kind else {
                        return Error::Mongo(err);
                    };

                    let WriteFailure::WriteError(write_error) = write_failure else {
                        return Error::Mongo(err);
                    };

                    const DUPLICATE_KEY_CODE: i32 = 11000;
                    match write_error.code == DUPLICATE_KEY_CODE {
                        true => Error::InsertUniqueViolation,
                        false => Error::Mongo(err),
                    }
                })?;

            Ok::<_, Error>(())
        })
        .await
    }

    async fn find(&self, id: i64) -> Result<Option<Resource>, Error> {
        self.bounded(async {
            self.database
                .collection::<ResourceEntity>(RESOURCES)
                .find_one(doc! {
                    "_id": id,
                })
                .await?
                .map(Resource::try_from)
                .transpose()
        })
        .await
    }

    async fn find_many(&self, status: Option<ResourceStatus>) -> Result<Vec<Resource>, Error> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_ref() },
            None => doc! {},
        };

        self.bounded(async {
            let entities = self
                .database
                .collection::<ResourceEntity>(RESOURCES)
                .find(filter)
                .sort(doc! { "_id": 1 })
                .await?
                .try_collect::<Vec<_>>()
                .await?;

            entities
                .into_iter()
                .map(Resource::try_from)
                .collect::<Result<Vec<_>, Error>>()
        })
        .await
    }

    async fn update_state(
        &self,
        id: i64,
        expected: ResourceState,
        new: ResourceState,
    ) -> Result<(), Error> {
        let filter = doc! {
            "_id": id,
            "status": expected.status().as_ref(),
            "blocked_until": expected.blocked_until().map(DateTime::from),
        };
        let update = doc! {
            "$set": {
                "status": new.status().as_ref(),
                "blocked_until": new.blocked_until().map(DateTime::from),
            }
        };

        let update_result = self
            .bounded(async {
                let update_result = self
                    .database
                    .collection::<Document>(RESOURCES)
                    .update_one(filter, update)
                    .await?;

                Ok::<_, Error>(update_result)
            })
            .await?;

        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mongodb::{options::ClientOptions, Client};
    use std::sync::Once;
    use time::{macros::datetime, OffsetDateTime};
    use uuid::Uuid;

    static BEFORE_ALL: Once = Once::new();

    fn init_env_variables() {
        let _ = dotenvy::dotenv();
    }

    async fn create_test_database() -> Database {
        let connection_string = std::env::var("AVAILABILITY_API_DB_CONNECTION_STRING").unwrap();
        let db_name = format!("test_{}", Uuid::new_v4());

        println!("creating test database: {db_name}");

        let db_client_options = ClientOptions::parse(connection_string).await.unwrap();
        let db_client = Client::with_options(db_client_options).unwrap();

        db_client.database(&db_name)
    }

    async fn destroy_test_database(database: Database) {
        let _ = database.drop().await;
        database.client().clone().shutdown().await;
    }

    async fn create_repository(db: &Database) -> MongoResourcesRepository {
        MongoResourcesRepository::new(db.clone(), Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn insert_values_unchanged() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        let until = datetime!(2030-01-01 10:30:15.250 UTC);
        let resource = Resource {
            id: 7,
            name: "Snoop Dog".to_string(),
            state: ResourceState::TemporaryBlocked { until },
        };

        repository.insert(&resource).await.unwrap();

        let entity = db
            .collection::<ResourceEntity>(RESOURCES)
            .find_one(doc! { "_id": 7_i64 })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entity.name, "Snoop Dog");
        assert_eq!(entity.status, "temporary_blocked");
        assert_eq!(entity.blocked_until.map(OffsetDateTime::from), Some(until));

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn insert_unique_id() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        repository
            .insert(&Resource::available(1, "LadyGaGa"))
            .await
            .unwrap();

        let err = repository
            .insert(&Resource::available(1, "T-Love"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsertUniqueViolation));

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn find_not_exist() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        let resource = repository.find(404).await.unwrap();

        assert!(resource.is_none());

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn find_many_filtered_and_sorted() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        for (id, state) in [
            (3, ResourceState::Blocked),
            (1, ResourceState::Blocked),
            (2, ResourceState::Available),
        ] {
            let resource = Resource {
                id,
                name: format!("resource {id}"),
                state,
            };
            repository.insert(&resource).await.unwrap();
        }

        let all = repository.find_many(None).await.unwrap();
        let blocked = repository
            .find_many(Some(ResourceStatus::Blocked))
            .await
            .unwrap();

        let all_ids = all.iter().map(|resource| resource.id).collect::<Vec<_>>();
        let blocked_ids = blocked.iter().map(|resource| resource.id).collect::<Vec<_>>();
        assert_eq!(all_ids, vec![1, 2, 3]);
        assert_eq!(blocked_ids, vec![1, 3]);

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn update_state_value_changed() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        let until = datetime!(2030-01-01 00:00 UTC);
        repository
            .insert(&Resource::available(1, "LadyGaGa"))
            .await
            .unwrap();

        repository
            .update_state(
                1,
                ResourceState::Available,
                ResourceState::TemporaryBlocked { until },
            )
            .await
            .unwrap();

        let resource = repository.find(1).await.unwrap().unwrap();
        assert_eq!(resource.state, ResourceState::TemporaryBlocked { until });

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn update_state_expected_state_mismatch() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        repository
            .insert(&Resource::available(1, "LadyGaGa"))
            .await
            .unwrap();

        let err = repository
            .update_state(1, ResourceState::Blocked, ResourceState::Available)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn update_state_not_exist() {
        BEFORE_ALL.call_once(init_env_variables);

        let db = create_test_database().await;
        let repository = create_repository(&db).await;

        let err = repository
            .update_state(1, ResourceState::Available, ResourceState::Blocked)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));

        destroy_test_database(db).await;
    }
}
