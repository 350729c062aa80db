//! Starting and finishing a login through the Descope authorization endpoint.

use std::time::Duration;

use log::*;
use oidc_auth::http::HttpClientBuilder;
use oidc_auth::oauth::providers::descope;
use oidc_auth::oauth::token::SessionWriter;
use oidc_auth::oauth::{flow, AuthorizationRequest, PendingLogin, Provider, TransientStore};
use serde::Deserialize;
use service::config::Config;
use url::form_urlencoded;

use crate::error::{config_error, DomainErrorKind, Error, InternalErrorKind};
use crate::error_code::ErrorCode;
use crate::gate::LOGIN_PATH;

/// Path of the page that renders authentication errors.
pub const ERROR_PAGE_PATH: &str = "/error-page";

/// Build the Descope provider described by `config`.
///
/// The API host comes from `descope_base_url` when set, otherwise from the
/// project id. Fails when neither a project id nor a client id is configured.
pub fn provider_from_config(config: &Config) -> Result<descope::Provider, Error> {
    let client_id = config.oidc_client_id().ok_or_else(|| {
        warn!("Neither an OIDC client id nor a Descope project id is configured");
        config_error("Missing Descope project id")
    })?;

    let base_url = config
        .descope_base_url()
        .unwrap_or_else(|| {
            descope::base_url_for_project(&config.descope_project_id().unwrap_or_default())
        });

    let http_client = HttpClientBuilder::new()
        .with_timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        })?;

    debug!("Using Descope API at {}", base_url);

    Ok(
        descope::Provider::new(base_url, client_id, config.redirect_uri(), http_client)
            .with_scope(config.oidc_scope())
            .with_flow_id(config.oidc_flow_id()),
    )
}

/// Begin a login attempt and return where to send the user agent.
///
/// Any attempt already held in `store` is replaced.
pub fn start<P, S>(
    config: &Config,
    provider: &P,
    store: &mut S,
    login_hint: Option<&str>,
) -> Result<AuthorizationRequest, Error>
where
    P: Provider + ?Sized,
    S: TransientStore + ?Sized,
{
    let login_hint = login_hint.map(str::trim).filter(|hint| !hint.is_empty());
    let request = flow::begin(provider, store, login_hint, config.verifier_length())?;
    info!("Starting login attempt, redirecting to the authorization endpoint");
    Ok(request)
}

/// Exchange the callback's code and hand the tokens to `writer`.
///
/// The attempt held in `store` is consumed whether or not this succeeds.
pub async fn finish<P, S, W>(
    provider: &P,
    store: &mut S,
    writer: &mut W,
    code: &str,
    state: Option<&str>,
) -> Result<(), Error>
where
    P: Provider + ?Sized,
    S: TransientStore + ?Sized,
    W: SessionWriter + ?Sized,
{
    flow::complete(provider, store, writer, code, state)
        .await
        .inspect_err(|e| warn!("Login could not be completed: {}", e))?;
    Ok(())
}

/// Forget any in-flight attempt held in `store`.
pub fn abandon<S: TransientStore + ?Sized>(store: &mut S) {
    PendingLogin::clear(store);
}

/// Query parameters the provider sends back to the callback URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// What a callback request asks for.
#[derive(Debug, PartialEq)]
pub enum CallbackOutcome<'a> {
    /// The provider reported a failure; pass it on untouched.
    ProviderError {
        error: &'a str,
        description: &'a str,
    },
    /// Neither a code nor an error was supplied.
    MissingCode,
    Code {
        code: &'a str,
        state: Option<&'a str>,
    },
}

impl CallbackQuery {
    pub fn outcome(&self) -> CallbackOutcome<'_> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return CallbackOutcome::ProviderError {
                error,
                description: self.error_description.as_deref().unwrap_or_default(),
            };
        }
        match self.code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => CallbackOutcome::Code {
                code,
                state: self.state.as_deref(),
            },
            None => CallbackOutcome::MissingCode,
        }
    }
}

fn location_with_error(path: &str, error: &str, description: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", error)
        .append_pair("error_description", description)
        .finish();
    format!("{path}?{query}")
}

/// Error surface location for a failed callback.
pub fn error_page_location(error: &str, description: &str) -> String {
    location_with_error(ERROR_PAGE_PATH, error, description)
}

/// Login page location reporting that an attempt could not be started.
pub fn start_failure_location() -> String {
    location_with_error(
        LOGIN_PATH,
        "initialization_failed",
        "Failed to initiate the magic link flow. Please try again.",
    )
}

/// Error surface location for a callback without an authorization code.
pub fn missing_code_location() -> String {
    error_page_location(
        ErrorCode::InvalidRequest.as_str(),
        "Missing required parameter: code",
    )
}

/// Error surface location for a domain error.
pub fn error_location(err: &Error) -> String {
    error_page_location(err.code().as_str(), &err.description())
}
