//! Error kinds reported to the user through the error page.

use std::fmt;
use std::str::FromStr;

/// Public error kind, carried in the `error` query parameter of the error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    MissingCodeVerifier,
    InvalidState,
    TokenExchangeFailed,
    TokenStorageFailed,
    ServerError,
    AuthenticationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::MissingCodeVerifier => "missing_code_verifier",
            ErrorCode::InvalidState => "invalid_state",
            ErrorCode::TokenExchangeFailed => "token_exchange_failed",
            ErrorCode::TokenStorageFailed => "token_storage_failed",
            ErrorCode::ServerError => "server_error",
            ErrorCode::AuthenticationFailed => "authentication_failed",
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "The request is missing a required parameter",
            ErrorCode::MissingCodeVerifier => {
                "Code verifier not found in storage. This may happen if you opened the magic link in a different browser or cleared your browser data."
            }
            ErrorCode::InvalidState => {
                "State parameter does not match the login attempt started in this browser."
            }
            ErrorCode::TokenExchangeFailed => "Failed to exchange authorization code for tokens",
            ErrorCode::TokenStorageFailed => "Failed to store authentication tokens",
            ErrorCode::ServerError => "An unexpected error occurred",
            ErrorCode::AuthenticationFailed => "Authentication failed. Please try again.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ErrorCodeParseError;

impl FromStr for ErrorCode {
    type Err = ErrorCodeParseError;
    fn from_str(code: &str) -> Result<ErrorCode, Self::Err> {
        match code {
            "invalid_request" => Ok(ErrorCode::InvalidRequest),
            "missing_code_verifier" => Ok(ErrorCode::MissingCodeVerifier),
            "invalid_state" => Ok(ErrorCode::InvalidState),
            "token_exchange_failed" => Ok(ErrorCode::TokenExchangeFailed),
            "token_storage_failed" => Ok(ErrorCode::TokenStorageFailed),
            "server_error" => Ok(ErrorCode::ServerError),
            "authentication_failed" => Ok(ErrorCode::AuthenticationFailed),
            _ => Err(ErrorCodeParseError),
        }
    }
}

/// Heading for an error kind: underscores become spaces, letters upper case.
///
/// Works for kinds this application never produces, such as those the
/// provider passes back on the callback.
pub fn heading(error: &str) -> String {
    error.replace('_', " ").to_uppercase()
}

/// Troubleshooting text for the error page, when there is something useful to say.
pub fn help_text(error: &str) -> Option<&'static str> {
    if error == "session_expired" || error.contains("state") {
        return Some(
            "This error typically occurs when the authentication session has expired or when using a magic link in a different browser than the one where you started the login process. Please try logging in again from the beginning.",
        );
    }
    match error.parse::<ErrorCode>() {
        Ok(ErrorCode::MissingCodeVerifier) => Some(
            "This error occurs when the browser can't find the necessary authentication data. This may happen if you opened the magic link in a different browser, cleared your browser data, or if your browser has restrictions on localStorage. Please try logging in again in the same browser.",
        ),
        Ok(ErrorCode::TokenExchangeFailed) => Some(
            "There was a problem exchanging your authentication code for access tokens. This could be due to an expired code or network issues. Please try logging in again.",
        ),
        _ => None,
    }
}

/// What the error page shows for an `error`/`error_description` query pair.
#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    pub heading: Option<String>,
    pub description: String,
    pub help: Option<&'static str>,
}

impl ErrorReport {
    pub fn new(error: Option<&str>, description: Option<&str>) -> Self {
        let description = description.filter(|d| !d.is_empty());
        match error.filter(|e| !e.is_empty()) {
            Some(error) => ErrorReport {
                heading: Some(heading(error)),
                description: description
                    .unwrap_or("An unknown error occurred during authentication.")
                    .to_string(),
                help: help_text(error),
            },
            None => ErrorReport {
                heading: None,
                description: "An unknown error occurred during the authentication process."
                    .to_string(),
                help: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_strings() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::MissingCodeVerifier,
            ErrorCode::InvalidState,
            ErrorCode::TokenExchangeFailed,
            ErrorCode::TokenStorageFailed,
            ErrorCode::ServerError,
            ErrorCode::AuthenticationFailed,
        ] {
            assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code));
        }
        assert!("access_denied".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading("missing_code_verifier"), "MISSING CODE VERIFIER");
        assert_eq!(heading("access_denied"), "ACCESS DENIED");
    }

    #[test]
    fn test_help_text_for_state_related_errors() {
        assert!(help_text("session_expired").is_some());
        assert!(help_text("invalid_state").is_some());
        assert_eq!(help_text("invalid_state"), help_text("state_mismatch"));
    }

    #[test]
    fn test_help_text_for_flow_errors() {
        assert!(help_text("missing_code_verifier")
            .unwrap()
            .contains("different browser"));
        assert!(help_text("token_exchange_failed")
            .unwrap()
            .contains("expired code"));
        assert_eq!(help_text("server_error"), None);
        assert_eq!(help_text("access_denied"), None);
    }

    #[test]
    fn test_error_report_defaults_description() {
        let report = ErrorReport::new(Some("token_exchange_failed"), None);
        assert_eq!(report.heading.as_deref(), Some("TOKEN EXCHANGE FAILED"));
        assert_eq!(
            report.description,
            "An unknown error occurred during authentication."
        );
        assert!(report.help.is_some());
    }

    #[test]
    fn test_error_report_without_error() {
        let report = ErrorReport::new(None, Some("ignored"));
        assert_eq!(report.heading, None);
        assert_eq!(report.help, None);
        assert_eq!(
            report.description,
            "An unknown error occurred during the authentication process."
        );
    }
}
