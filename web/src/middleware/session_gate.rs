use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use domain::gate::{self, GateDecision};
use domain::session::ACCESS_TOKEN_COOKIE;
use log::*;

use crate::AppState;

/// Redirects page requests according to the expiry of the access token cookie.
///
/// Only mounted on page routes. Passes everything through when the gate is
/// disabled in configuration.
pub async fn session_gate(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if !app_state.config.enforce_session_gate {
        return next.run(request).await;
    }

    let access_token = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());
    match gate::evaluate(
        request.uri().path(),
        access_token.as_deref(),
        Utc::now().timestamp(),
    ) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::Redirect(target) => {
            debug!("Session gate redirecting {} to {}", request.uri().path(), target);
            Redirect::temporary(target).into_response()
        }
    }
}
