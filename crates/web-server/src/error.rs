// In crates/web-server/src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Already redacted unless the server runs in development mode.
    #[error("{0}")]
    Internal(String),

    #[error("Failed to bind the server address: {0}")]
    ServerBindError(std::io::Error),

    #[error("Server terminated with an error: {0}")]
    ServerError(std::io::Error),
}

impl Error {
    /// Builds an internal error, keeping `detail` only when `expose` is set.
    pub fn internal(detail: impl Into<String>, expose: bool) -> Self {
        let detail = detail.into();
        tracing::error!(detail = %detail, "Internal error while handling request.");
        if expose {
            Error::Internal(detail)
        } else {
            Error::Internal(GENERIC_INTERNAL_MESSAGE.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) | Error::ServerBindError(_) | Error::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<core_types::Error> for Error {
    fn from(err: core_types::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<strategies::Error> for Error {
    fn from(err: strategies::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::ServerBindError(_) | Error::ServerError(_) => GENERIC_INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        if status.is_client_error() {
            tracing::info!(%status, error = %message, "Request rejected.");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_hidden_outside_development() {
        assert_eq!(
            Error::internal("index out of bounds in handler", false).to_string(),
            GENERIC_INTERNAL_MESSAGE
        );
        assert_eq!(
            Error::internal("index out of bounds in handler", true).to_string(),
            "index out of bounds in handler"
        );
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(Error::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::from(core_types::Error::InvalidInterval("7m".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(strategies::Error::InvalidWindows { short: 9, long: 3 }).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
