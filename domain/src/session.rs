//! Turning issued tokens into the durable session cookie set.
//!
//! The cookie set is computed and validated in full before anything is handed
//! to the response, so a rejected token payload leaves no cookie behind.

use log::*;
use oidc_auth::error::{token_error, TokenErrorKind};
use oidc_auth::oauth::token::{SessionWriter, TokenSet};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::Error;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const ID_TOKEN_COOKIE: &str = "id_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const EXPIRES_IN_COOKIE: &str = "expires_in";

/// Every cookie a session may consist of.
pub const SESSION_COOKIE_NAMES: [&str; 4] = [
    ACCESS_TOKEN_COOKIE,
    ID_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
    EXPIRES_IN_COOKIE,
];

/// Lifetime of the access and ID token cookies when the provider gives none.
pub const DEFAULT_TOKEN_MAX_AGE_SECS: i64 = 3600;
/// Lifetime of the refresh token cookie.
pub const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// `expires_in` as browsers post it: a JSON number or a numeric string.
/// Fractional values are truncated to whole seconds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExpiresIn {
    Seconds(i64),
    Fractional(f64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Result<i64, oidc_auth::Error> {
        match self {
            ExpiresIn::Seconds(seconds) => Ok(*seconds),
            ExpiresIn::Fractional(seconds) => Ok(seconds.trunc() as i64),
            ExpiresIn::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        text.parse::<f64>()
                            .ok()
                            .filter(|seconds| seconds.is_finite())
                            .map(|seconds| seconds.trunc() as i64)
                    })
                    .ok_or_else(|| {
                        token_error(TokenErrorKind::InvalidExpiry, "Invalid expires_in value")
                    })
            }
        }
    }
}

/// Body accepted by the store-tokens endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreTokensRequest {
    #[schema(value_type = String)]
    pub access_token: Option<SecretString>,
    #[schema(value_type = String)]
    pub id_token: Option<SecretString>,
    #[schema(value_type = Option<String>)]
    pub refresh_token: Option<SecretString>,
    /// Seconds until the access and ID tokens expire, as a number or numeric string.
    #[schema(value_type = Option<i64>)]
    pub expires_in: Option<ExpiresIn>,
}

impl StoreTokensRequest {
    /// Normalize into the shape a token exchange produces.
    pub fn into_token_set(self) -> Result<TokenSet, Error> {
        let expires_in = self.expires_in.as_ref().map(ExpiresIn::seconds).transpose()?;
        Ok(TokenSet {
            access_token: self.access_token,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_in,
            token_type: None,
        })
    }
}

/// One cookie of the session set.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCookie {
    pub name: &'static str,
    pub value: String,
    pub max_age_secs: i64,
}

/// Session cookies collected from a completed login.
#[derive(Debug, Default)]
pub struct SessionCookies {
    cookies: Vec<SessionCookie>,
}

impl SessionCookies {
    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    pub fn into_cookies(self) -> Vec<SessionCookie> {
        self.cookies
    }

    /// Compute the full cookie set for `tokens`.
    ///
    /// Access and ID tokens are required. A zero `expires_in` counts as absent;
    /// a negative one is rejected.
    pub fn from_tokens(tokens: &TokenSet) -> Result<Vec<SessionCookie>, oidc_auth::Error> {
        let (access_token, id_token) = match (non_empty(&tokens.access_token), non_empty(&tokens.id_token)) {
            (Some(access_token), Some(id_token)) => (access_token, id_token),
            _ => {
                warn!("Token set is missing an access or ID token");
                return Err(token_error(
                    TokenErrorKind::MissingToken,
                    "Missing required tokens",
                ));
            }
        };

        let expires_in = match tokens.expires_in {
            Some(seconds) if seconds < 0 => {
                return Err(token_error(
                    TokenErrorKind::InvalidExpiry,
                    "Invalid expires_in value",
                ))
            }
            Some(0) | None => None,
            Some(seconds) => Some(seconds),
        };
        let max_age_secs = expires_in.unwrap_or(DEFAULT_TOKEN_MAX_AGE_SECS);

        let mut cookies = vec![
            SessionCookie {
                name: ACCESS_TOKEN_COOKIE,
                value: access_token.to_string(),
                max_age_secs,
            },
            SessionCookie {
                name: ID_TOKEN_COOKIE,
                value: id_token.to_string(),
                max_age_secs,
            },
        ];
        if let Some(refresh_token) = non_empty(&tokens.refresh_token) {
            cookies.push(SessionCookie {
                name: REFRESH_TOKEN_COOKIE,
                value: refresh_token.to_string(),
                max_age_secs: REFRESH_TOKEN_MAX_AGE_SECS,
            });
        }
        if let Some(seconds) = expires_in {
            cookies.push(SessionCookie {
                name: EXPIRES_IN_COOKIE,
                value: seconds.to_string(),
                max_age_secs: seconds,
            });
        }
        Ok(cookies)
    }
}

impl SessionWriter for SessionCookies {
    fn write(&mut self, tokens: &TokenSet) -> Result<(), oidc_auth::Error> {
        self.cookies = Self::from_tokens(tokens)?;
        debug!("Prepared {} session cookies", self.cookies.len());
        Ok(())
    }
}

/// Validate a posted token payload and produce its cookie set.
pub fn materialize(request: StoreTokensRequest) -> Result<Vec<SessionCookie>, Error> {
    let tokens = request.into_token_set()?;
    let mut cookies = SessionCookies::default();
    cookies.write(&tokens)?;
    Ok(cookies.into_cookies())
}

fn non_empty(token: &Option<SecretString>) -> Option<&str> {
    token
        .as_ref()
        .map(|t| t.expose_secret().as_str())
        .filter(|t| !t.is_empty())
}
