use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::{write_envelope, Payload};
use crate::users::repo::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    /// `context` is what the client sees; `source` only reaches the logs.
    #[error("{context}: {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn persistence(context: &'static str, source: StoreError) -> Self {
        ApiError::Persistence { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Persistence { context, source } => {
                tracing::error!(error = %source, "{}", context);
                context.to_string()
            }
            ApiError::NotFound => "Not found".to_string(),
            ApiError::BadRequest(msg) | ApiError::MethodNotAllowed(msg) | ApiError::Conflict(msg) => msg,
        };
        write_envelope(status, Payload::Error(message))
    }
}
