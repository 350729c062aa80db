//! Error types for the `domain` layer.
use oidc_auth::error::{
    Error as OidcAuthError, ErrorKind as OidcAuthErrorKind, OAuthErrorKind, TokenErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

use crate::error_code::ErrorCode;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error. `web` never
/// depends on `oidc-auth` directly; it only sees the kinds defined here and the
/// public [`ErrorCode`] each one maps to.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Auth(AuthErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

/// Failures of the login sequence that are reported to the user by kind.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    InvalidRequest(String),
    MissingCodeVerifier,
    InvalidState,
    TokenExchangeFailed(String),
    TokenStorageFailed,
}

impl Error {
    /// The public error kind shown on the error surface.
    pub fn code(&self) -> ErrorCode {
        match &self.error_kind {
            DomainErrorKind::Auth(kind) => match kind {
                AuthErrorKind::InvalidRequest(_) => ErrorCode::InvalidRequest,
                AuthErrorKind::MissingCodeVerifier => ErrorCode::MissingCodeVerifier,
                AuthErrorKind::InvalidState => ErrorCode::InvalidState,
                AuthErrorKind::TokenExchangeFailed(_) => ErrorCode::TokenExchangeFailed,
                AuthErrorKind::TokenStorageFailed => ErrorCode::TokenStorageFailed,
            },
            DomainErrorKind::Internal(_) | DomainErrorKind::External(_) => ErrorCode::ServerError,
        }
    }

    /// Human readable description to pair with [`Error::code`].
    pub fn description(&self) -> String {
        match &self.error_kind {
            DomainErrorKind::Auth(AuthErrorKind::InvalidRequest(description))
            | DomainErrorKind::Auth(AuthErrorKind::TokenExchangeFailed(description)) => {
                description.clone()
            }
            _ => self.code().default_description().to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `oidc-auth` layer to the `domain` layer.
impl From<OidcAuthError> for Error {
    fn from(err: OidcAuthError) -> Self {
        let error_kind = match &err.error_kind {
            OidcAuthErrorKind::OAuth(kind) => match kind {
                OAuthErrorKind::InvalidRequest => DomainErrorKind::Auth(
                    AuthErrorKind::InvalidRequest(err.message().unwrap_or_default()),
                ),
                OAuthErrorKind::MissingCodeVerifier => {
                    DomainErrorKind::Auth(AuthErrorKind::MissingCodeVerifier)
                }
                OAuthErrorKind::InvalidState => DomainErrorKind::Auth(AuthErrorKind::InvalidState),
                OAuthErrorKind::TokenExchangeFailed => {
                    DomainErrorKind::Auth(AuthErrorKind::TokenExchangeFailed(
                        err.message()
                            .unwrap_or_else(|| ErrorCode::TokenExchangeFailed.default_description().to_string()),
                    ))
                }
                OAuthErrorKind::InvalidResponse => DomainErrorKind::External(
                    ExternalErrorKind::Other("Invalid response from Descope".to_string()),
                ),
                OAuthErrorKind::InvalidConfiguration => {
                    DomainErrorKind::Internal(InternalErrorKind::Config)
                }
            },
            OidcAuthErrorKind::Token(kind) => match kind {
                TokenErrorKind::Storage => DomainErrorKind::Auth(AuthErrorKind::TokenStorageFailed),
                TokenErrorKind::MissingToken | TokenErrorKind::InvalidExpiry => {
                    DomainErrorKind::Auth(AuthErrorKind::InvalidRequest(
                        err.message().unwrap_or_default(),
                    ))
                }
            },
            OidcAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            OidcAuthErrorKind::Pkce(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oidc_auth::error::{oauth_error, storage_error, token_error, HttpErrorKind};

    #[test]
    fn test_exchange_failure_keeps_provider_description() {
        let err: Error =
            oauth_error(OAuthErrorKind::TokenExchangeFailed, "Code has expired").into();
        assert_eq!(err.code(), ErrorCode::TokenExchangeFailed);
        assert_eq!(err.description(), "Code has expired");
    }

    #[test]
    fn test_missing_verifier_maps_to_public_code() {
        let err: Error = oauth_error(OAuthErrorKind::MissingCodeVerifier, "gone").into();
        assert_eq!(err.code(), ErrorCode::MissingCodeVerifier);
        assert_eq!(
            err.description(),
            ErrorCode::MissingCodeVerifier.default_description()
        );
    }

    #[test]
    fn test_storage_failure_maps_to_token_storage_failed() {
        let cause = token_error(TokenErrorKind::MissingToken, "Missing required tokens");
        let err: Error = storage_error(cause).into();
        assert_eq!(err.code(), ErrorCode::TokenStorageFailed);
    }

    #[test]
    fn test_missing_token_maps_to_invalid_request() {
        let err: Error = token_error(TokenErrorKind::MissingToken, "Missing required tokens").into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.description(), "Missing required tokens");
    }

    #[test]
    fn test_network_failure_is_server_error() {
        let err: Error = OidcAuthError {
            source: None,
            error_kind: OidcAuthErrorKind::Http(HttpErrorKind::Network),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::ServerError);
        assert_eq!(err.description(), "An unexpected error occurred");
    }
}
