use crate::{
    application::{ApplicationMiddleware, ApplicationState},
    dto::{input, output},
    error::Error,
    service::availability_service::AvailabilityService,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routing(application_middleware: &ApplicationMiddleware) -> Router<ApplicationState> {
    Router::new()
        .route("/api/resources", get(get_resources))
        .route("/api/resources/:id", get(get_resource))
        .route("/api/resources/:id/block", post(block_resource))
        .route(
            "/api/resources/:id/temporary-block",
            post(temporary_block_resource),
        )
        .route("/api/resources/:id/unblock", post(unblock_resource))
        .layer(application_middleware.body_limit.clone())
}

async fn get_resources(
    State(availability_service): State<Arc<dyn AvailabilityService>>,
    Query(query): Query<input::ResourcesQuery>,
) -> Result<Json<output::Resources>, Error> {
    let resources = availability_service
        .find_resources(query.status)
        .await?
        .into_iter()
        .map(output::Resource::from)
        .collect();

    Ok(Json(output::Resources { resources }))
}

async fn get_resource(
    State(availability_service): State<Arc<dyn AvailabilityService>>,
    Path(id): Path<i64>,
) -> Result<Json<output::Resource>, Error> {
    let resource = availability_service.find_resource(id).await?;

    Ok(Json(resource.into()))
}

async fn block_resource(
    State(availability_service): State<Arc<dyn AvailabilityService>>,
    Path(id): Path<i64>,
) -> Result<Json<output::Resource>, Error> {
    let resource = availability_service.block_resource(id).await?;

    Ok(Json(resource.into()))
}

async fn temporary_block_resource(
    State(availability_service): State<Arc<dyn AvailabilityService>>,
    Path(id): Path<i64>,
    payload: Result<Json<input::TemporaryBlock>, JsonRejection>,
) -> Result<Json<output::Resource>, Error> {
    let Json(temporary_block) = payload.map_err(|err| Error::InvalidBody(err.body_text()))?;

    let resource = availability_service
        .temporary_block_resource(id, temporary_block.until)
        .await?;

    Ok(Json(resource.into()))
}

async fn unblock_resource(
    State(availability_service): State<Arc<dyn AvailabilityService>>,
    Path(id): Path<i64>,
) -> Result<Json<output::Resource>, Error> {
    let resource = availability_service.unblock_resource(id).await?;

    Ok(Json(resource.into()))
}
