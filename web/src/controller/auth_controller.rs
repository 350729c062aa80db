//! Controller for the login sequence.
//!
//! In server exchange mode the PKCE verifier lives in signed transient cookies
//! and the code is exchanged inside the callback handler. In browser exchange
//! mode the verifier lives in the browser's localStorage and the callback
//! returns a page that performs the exchange itself, then posts the tokens to
//! `store_tokens`.

use crate::extractors::TransientCookies;
use crate::templates::{render, CallbackTemplate, RedirectingTemplate, STORAGE_KEYS};
use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::gate::{DASHBOARD_PATH, LOGIN_PATH};
use domain::login::{self, CallbackOutcome, CallbackQuery};
use domain::session::{self, SessionCookie, SessionCookies, StoreTokensRequest, SESSION_COOKIE_NAMES};
use domain::MemoryStore;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::ExchangeMode;
use time::Duration;
use utoipa::ToSchema;

/// Form posted by the login page.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Passed to the provider as `login_hint`.
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreTokensResponse {
    pub success: bool,
}

/// POST /login/start
///
/// Starts a login attempt and sends the user agent to the Descope
/// authorization endpoint.
#[utoipa::path(
    post,
    path = "/login/start",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Browser exchange mode: page that records the attempt and redirects"),
        (status = 303, description = "Server exchange mode: redirect to the authorization endpoint"),
    )
)]
pub async fn start(
    State(app_state): State<AppState>,
    mut transient: TransientCookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let login_hint = form.email.as_deref();

    match app_state.config.exchange_mode {
        ExchangeMode::Server => {
            match login::start(
                &app_state.config,
                app_state.provider.as_ref(),
                &mut transient,
                login_hint,
            ) {
                Ok(request) => (transient, Redirect::to(&request.url)).into_response(),
                Err(e) => {
                    error!("Failed to start login attempt: {e}");
                    Redirect::to(&login::start_failure_location()).into_response()
                }
            }
        }
        ExchangeMode::Browser => {
            let mut store = MemoryStore::default();
            match login::start(
                &app_state.config,
                app_state.provider.as_ref(),
                &mut store,
                login_hint,
            ) {
                Ok(request) => render(&RedirectingTemplate {
                    keys: STORAGE_KEYS,
                    code_verifier: request.pkce_verifier.as_str().to_string(),
                    state: request.state,
                    issued_at_millis: request.issued_at_millis,
                    authorization_url: request.url,
                }),
                Err(e) => {
                    error!("Failed to start login attempt: {e}");
                    Redirect::to(&login::start_failure_location()).into_response()
                }
            }
        }
    }
}

/// GET /login/retry
///
/// Forgets the in-flight attempt and returns to the login page.
pub async fn retry(mut transient: TransientCookies) -> impl IntoResponse {
    login::abandon(&mut transient);
    (transient, Redirect::temporary(LOGIN_PATH))
}

/// GET /api/auth/callback
///
/// Receives the authorization code (or an error) from Descope.
#[utoipa::path(
    get,
    path = "/api/auth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State sent with the authorization request"),
        ("error" = Option<String>, Query, description = "Error reported by the provider"),
        ("error_description" = Option<String>, Query, description = "Description of the provider error"),
    ),
    responses(
        (status = 200, description = "Browser exchange mode: page that exchanges the code"),
        (status = 307, description = "Redirect to the dashboard or to the error page"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    mut transient: TransientCookies,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let (code, state) = match params.outcome() {
        CallbackOutcome::ProviderError { error, description } => {
            warn!("Provider returned an error to the callback: {error} - {description}");
            return Redirect::temporary(&login::error_page_location(error, description))
                .into_response();
        }
        CallbackOutcome::MissingCode => {
            warn!("Callback is missing required parameter: code");
            return Redirect::temporary(&login::missing_code_location()).into_response();
        }
        CallbackOutcome::Code { code, state } => (code, state),
    };

    if app_state.config.exchange_mode == ExchangeMode::Browser {
        let provider = app_state.provider.as_ref();
        return render(&CallbackTemplate {
            keys: STORAGE_KEYS,
            token_endpoint: provider.token_endpoint(),
            client_id: provider.client_id().to_string(),
            redirect_uri: provider.redirect_uri().to_string(),
        });
    }

    let mut session = SessionCookies::default();
    match login::finish(
        app_state.provider.as_ref(),
        &mut transient,
        &mut session,
        code,
        state,
    )
    .await
    {
        Ok(()) => {
            let jar = add_session_cookies(jar, session.into_cookies(), app_state.config.cookie_secure);
            (transient, jar, Redirect::temporary(DASHBOARD_PATH)).into_response()
        }
        Err(e) => (transient, Redirect::temporary(&login::error_location(&e))).into_response(),
    }
}

/// POST /api/auth/store-tokens
///
/// Stores a token set obtained by the browser as session cookies.
#[utoipa::path(
    post,
    path = "/api/auth/store-tokens",
    request_body(content = StoreTokensRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Session cookies set", body = StoreTokensResponse),
        (status = 400, description = "Missing required tokens or invalid expires_in"),
        (status = 500, description = "Unreadable request body"),
    )
)]
pub async fn store_tokens(
    State(app_state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let request: StoreTokensRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to parse token payload: {e}");
        DomainError {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Unreadable token payload".to_string(),
            )),
        }
    })?;

    let cookies = session::materialize(request)?;
    info!("Stored session tokens posted by the browser");

    Ok((
        add_session_cookies(jar, cookies, app_state.config.cookie_secure),
        Json(StoreTokensResponse { success: true }),
    ))
}

/// POST /logout
///
/// Removes every session cookie and any in-flight login attempt.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Redirect to the login page"),
    )
)]
pub async fn logout(mut transient: TransientCookies, jar: CookieJar) -> impl IntoResponse {
    login::abandon(&mut transient);
    let jar = SESSION_COOKIE_NAMES
        .iter()
        .fold(jar, |jar, name| jar.remove(Cookie::build(*name).path("/")));
    info!("Session cookies cleared");
    (transient, jar, Redirect::to(LOGIN_PATH))
}

fn add_session_cookies(jar: CookieJar, cookies: Vec<SessionCookie>, secure: bool) -> CookieJar {
    cookies.into_iter().fold(jar, |jar, cookie| {
        jar.add(
            Cookie::build((cookie.name, cookie.value))
                .path("/")
                .http_only(true)
                .secure(secure)
                .same_site(SameSite::Lax)
                .max_age(Duration::seconds(cookie.max_age_secs)),
        )
    })
}
