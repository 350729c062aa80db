//! Errors raised while running an authorization code login.
//!
//! Each error carries a kind for callers to branch on and, usually, a source
//! whose text is safe to show to the user.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Pkce(PkceErrorKind),
    OAuth(OAuthErrorKind),
    Token(TokenErrorKind),
    Http(HttpErrorKind),
}

/// Errors from PKCE verifier handling.
#[derive(Debug, PartialEq)]
pub enum PkceErrorKind {
    InvalidLength,
    InvalidCharacter,
}

/// Errors from the authorization code flow.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    InvalidRequest,
    MissingCodeVerifier,
    InvalidState,
    TokenExchangeFailed,
    InvalidResponse,
    InvalidConfiguration,
}

/// Errors from handing tokens to a session writer.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    MissingToken,
    InvalidExpiry,
    Storage,
}

/// Transport failures talking to the provider.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// The message attached when the error was created, if any.
    pub fn message(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error_kind, self.message()) {
            (ErrorKind::Pkce(kind), _) => write!(f, "PKCE {kind:?}"),
            (ErrorKind::OAuth(kind), Some(message)) => write!(f, "OAuth {kind:?}: {message}"),
            (ErrorKind::OAuth(kind), None) => write!(f, "OAuth {kind:?}"),
            (ErrorKind::Token(kind), _) => write!(f, "token {kind:?}"),
            (ErrorKind::Http(kind), _) => write!(f, "HTTP {kind:?}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidConfiguration),
        }
    }
}

pub fn pkce_error(kind: PkceErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Pkce(kind),
    }
}

/// Build an OAuth error whose message is shown to the user.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Wraps a session writer failure so callers see a single storage error kind.
pub fn storage_error(cause: Error) -> Error {
    Error {
        source: Some(Box::new(cause)),
        error_kind: ErrorKind::Token(TokenErrorKind::Storage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_returns_helper_text() {
        let err = oauth_error(OAuthErrorKind::TokenExchangeFailed, "code expired");
        assert_eq!(err.message(), Some("code expired".to_string()));
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
    }

    #[test]
    fn test_display_includes_oauth_message() {
        let err = oauth_error(OAuthErrorKind::InvalidState, "State mismatch");
        assert_eq!(err.to_string(), "OAuth InvalidState: State mismatch");
    }

    #[test]
    fn test_storage_error_keeps_cause() {
        let cause = token_error(TokenErrorKind::MissingToken, "Missing required tokens");
        let err = storage_error(cause);
        assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::Storage));
        assert!(StdError::source(&err).is_some());
    }
}
