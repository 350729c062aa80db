use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use domain::TransientStore;
use time::Duration;

use crate::AppState;

/// The in-flight login attempt, kept in signed http-only cookies.
///
/// Values can only be read back by this server, and each cookie expires on its
/// own after the configured transient max-age. Changes made through
/// [`TransientStore`] reach the browser when this is returned as part of a
/// response.
pub(crate) struct TransientCookies {
    jar: SignedCookieJar,
    max_age: Duration,
    secure: bool,
}

impl FromRequestParts<AppState> for TransientCookies {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_request_parts(parts, state).await?;
        Ok(Self {
            jar,
            max_age: Duration::seconds(state.config.transient_cookie_max_age_secs),
            secure: state.config.cookie_secure,
        })
    }
}

impl TransientStore for TransientCookies {
    fn get(&self, key: &str) -> Option<String> {
        self.jar.get(key).map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, key: &str, value: String) {
        let cookie = Cookie::build((key.to_string(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(self.max_age);
        self.jar = self.jar.clone().add(cookie);
    }

    fn remove(&mut self, key: &str) {
        self.jar = self
            .jar
            .clone()
            .remove(Cookie::build(key.to_string()).path("/"));
    }
}

impl IntoResponseParts for TransientCookies {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
