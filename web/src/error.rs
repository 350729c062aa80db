use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use domain::error::{AuthErrorKind, DomainErrorKind, Error as DomainError, ExternalErrorKind};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Auth(auth_error_kind) => match auth_error_kind {
                AuthErrorKind::InvalidRequest(_)
                | AuthErrorKind::MissingCodeVerifier
                | AuthErrorKind::InvalidState => StatusCode::BAD_REQUEST,
                AuthErrorKind::TokenExchangeFailed(_) => StatusCode::BAD_GATEWAY,
                AuthErrorKind::TokenStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            DomainErrorKind::External(ExternalErrorKind::Network) => StatusCode::BAD_GATEWAY,
            DomainErrorKind::External(_) | DomainErrorKind::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

/// JSON body of every error returned by the API endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: &'static str,
    pub error_description: String,
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.code().as_str(),
            error_description: self.0.description(),
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use domain::error::{config_error, DomainErrorKind};
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_request_is_bad_request_with_description() {
        let err = Error::from(DomainError {
            source: None,
            error_kind: DomainErrorKind::Auth(AuthErrorKind::InvalidRequest(
                "Missing required tokens".to_string(),
            )),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "invalid_request", "error_description": "Missing required tokens"})
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_reported_as_server_error() {
        let response = Error::from(config_error("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "server_error", "error_description": "An unexpected error occurred"})
        );
    }
}
