use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use booksearch_core::Error;

/// Errors surfaced by handlers, mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    /// The blocking task running the engine call panicked or was cancelled.
    Task(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Task(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::EngineCommunication(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(Error::InvalidDocumentPayload { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Core(Error::InvalidConfig(_)) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Core(err) => err.to_string(),
            ApiError::Task(msg) => format!("Request task failed: {msg}"),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::debug!(%status, error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::from(Error::InvalidQuery("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(Error::engine("down")).status(), StatusCode::SERVICE_UNAVAILABLE);
        let payload = serde_json::from_str::<booksearch_core::Book>(r#"{"id":5}"#).unwrap_err();
        assert_eq!(
            ApiError::from(Error::InvalidDocumentPayload { index: 0, source: payload }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ApiError::Task("panicked".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
