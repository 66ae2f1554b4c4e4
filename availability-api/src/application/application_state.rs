use super::{ApplicationEnv, EventsEnv, StoreEnv};
use crate::{
    clock::SystemClock,
    repository::{
        self, InMemoryResourcesRepository, MongoResourcesRepository, Resource,
        ResourcesRepository,
    },
    service::{
        availability_service::{AvailabilityService, AvailabilityServiceImpl},
        events_service::{
            EventsService, RabbitmqEventsService, RabbitmqEventsServiceConfig,
            TracingEventsService,
        },
    },
};
use axum::extract::FromRef;
use mongodb::{options::ClientOptions, Client};
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationState {
    pub availability_service: Arc<dyn AvailabilityService>,
}

pub struct ApplicationStateToClose {
    pub db_client: Option<Client>,
    pub rabbitmq_events_service: Option<Arc<RabbitmqEventsService>>,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("creating repositories");
    let (resources_repository, db_client): (Arc<dyn ResourcesRepository>, _) = match &env.store {
        StoreEnv::Memory => (
            Arc::new(InMemoryResourcesRepository::new()) as Arc<dyn ResourcesRepository>,
            None,
        ),
        StoreEnv::Mongodb {
            connection_string,
            name,
            timeout,
        } => {
            tracing::info!("connecting to database");
            let mut db_client_options = ClientOptions::parse(connection_string).await?;
            db_client_options.server_selection_timeout = Some(*timeout);
            db_client_options.connect_timeout = Some(*timeout);
            let db_client = Client::with_options(db_client_options)?;
            let db = db_client.database(name);

            let resources_repository = MongoResourcesRepository::new(db, *timeout).await?;

            (
                Arc::new(resources_repository) as Arc<dyn ResourcesRepository>,
                Some(db_client),
            )
        }
    };

    seed_resources(resources_repository.as_ref(), &env.seed_resources).await?;

    tracing::info!("creating services");
    let (events_service, rabbitmq_events_service): (Arc<dyn EventsService>, _) = match &env.events
    {
        EventsEnv::Tracing => (Arc::new(TracingEventsService) as Arc<dyn EventsService>, None),
        EventsEnv::Rabbitmq {
            connection_string,
            exchange_name,
            retry_interval,
        } => {
            let config = RabbitmqEventsServiceConfig {
                connection_string: connection_string.clone(),
                exchange: exchange_name.clone(),
                retry_interval: *retry_interval,
            };
            let rabbitmq_events_service = RabbitmqEventsService::new(config).await?;
            let rabbitmq_events_service = Arc::new(rabbitmq_events_service);

            (
                rabbitmq_events_service.clone() as Arc<dyn EventsService>,
                Some(rabbitmq_events_service),
            )
        }
    };

    let availability_service = AvailabilityServiceImpl::new(
        resources_repository,
        events_service,
        Arc::new(SystemClock),
    );
    let availability_service = Arc::new(availability_service);

    Ok((
        ApplicationState {
            availability_service,
        },
        ApplicationStateToClose {
            db_client,
            rabbitmq_events_service,
        },
    ))
}

async fn seed_resources(
    repository: &dyn ResourcesRepository,
    resources: &[(i64, String)],
) -> anyhow::Result<()> {
    for (id, name) in resources {
        match repository.insert(&Resource::available(*id, name.as_str())).await {
            Ok(()) => tracing::info!(id = *id, name = name.as_str(), "seeded resource"),
            Err(repository::Error::InsertUniqueViolation) => {
                tracing::debug!(id = *id, "resource already exists")
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
