use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use tracing::warn;

use crate::errors::Error;

#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        };

        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], format!("{}\n", message))
            .into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            err @ Error::Decode { .. } => ApiError::BadRequest(err.to_string()),
            err @ Error::NotFound { .. } => ApiError::NotFound(err.to_string()),
            Error::Transport(msg) | Error::Graphql(msg) => {
                warn!(error = %msg, "Backend request failed");
                ApiError::Internal(msg)
            }
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
            Error::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}
