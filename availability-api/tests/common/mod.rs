use availability_api::{
    application::{self, ApplicationState},
    clock::ManualClock,
    repository::{InMemoryResourcesRepository, Resource, ResourcesRepository},
    service::{
        availability_service::AvailabilityServiceImpl,
        events_service::{EventsService, ResourceEvent},
    },
};
use axum::{
    async_trait,
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use time::{macros::datetime, OffsetDateTime};
use tower::ServiceExt;

pub const NOW: OffsetDateTime = datetime!(2030-01-01 12:00 UTC);
pub const MAX_HTTP_CONTENT_LEN: usize = 1024;

#[derive(Default)]
pub struct RecordingEventsService {
    events: Mutex<Vec<ResourceEvent>>,
}

impl RecordingEventsService {
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventsService for RecordingEventsService {
    async fn publish(&self, event: ResourceEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct TestApplication {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub events_service: Arc<RecordingEventsService>,
}

impl TestApplication {
    ///
    /// Application with resources `1=LadyGaGa`, `2=T-Love`, `3=Snoop Dog`
    /// and clock stopped at [NOW]
    ///
    pub async fn new() -> Self {
        let repository = InMemoryResourcesRepository::new();
        for (id, name) in [(1, "LadyGaGa"), (2, "T-Love"), (3, "Snoop Dog")] {
            repository
                .insert(&Resource::available(id, name))
                .await
                .unwrap();
        }

        let clock = Arc::new(ManualClock::new(NOW));
        let events_service = Arc::new(RecordingEventsService::default());
        let availability_service = AvailabilityServiceImpl::new(
            Arc::new(repository),
            events_service.clone(),
            clock.clone(),
        );

        let router = application::create_application(
            ApplicationState {
                availability_service: Arc::new(availability_service),
            },
            application::create_middleware(MAX_HTTP_CONTENT_LEN),
        );

        Self {
            router,
            clock,
            events_service,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Body::empty()).await
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Body::from(body.to_string()))
            .await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };

        (status, body)
    }
}
