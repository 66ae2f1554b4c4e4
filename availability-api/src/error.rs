use crate::repository::{self, ResourceStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("resource {0} not exist")]
    ResourceNotExist(i64),

    #[error("resource {id} is {status}, transition not allowed")]
    ResourceConflict { id: i64, status: ResourceStatus },

    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("database error: {0}")]
    Database(#[from] repository::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Database(_) => tracing::error!(err = %self),
            _ => tracing::info!(err = %self),
        }

        match self {
            Error::ResourceNotExist(_) => StatusCode::NOT_FOUND,
            Error::ResourceConflict { id: _, status: _ } => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
        .into_response()
    }
}
