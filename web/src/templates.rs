use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use domain::error_code::ErrorReport;
use domain::{CODE_VERIFIER_KEY, STATE_KEY, TIMESTAMP_KEY};
use log::*;

/// localStorage keys the browser-side scripts read and write.
pub(crate) struct StorageKeys {
    pub(crate) code_verifier: &'static str,
    pub(crate) timestamp: &'static str,
    pub(crate) state: &'static str,
}

pub(crate) const STORAGE_KEYS: StorageKeys = StorageKeys {
    code_verifier: CODE_VERIFIER_KEY,
    timestamp: TIMESTAMP_KEY,
    state: STATE_KEY,
};

#[derive(Template)]
#[template(path = "home.html")]
pub(crate) struct HomeTemplate;

#[derive(Template)]
#[template(path = "login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) keys: StorageKeys,
    pub(crate) banner: Option<Banner>,
}

/// Error banner shown above the login form.
pub(crate) struct Banner {
    pub(crate) heading: String,
    pub(crate) description: String,
}

/// Browser exchange mode: records the attempt in localStorage, then leaves
/// for the authorization endpoint.
#[derive(Template)]
#[template(path = "redirecting.html")]
pub(crate) struct RedirectingTemplate {
    pub(crate) keys: StorageKeys,
    pub(crate) authorization_url: String,
    pub(crate) code_verifier: String,
    pub(crate) state: String,
    pub(crate) issued_at_millis: i64,
}

/// Browser exchange mode: exchanges the code with the verifier from
/// localStorage and posts the tokens to the store-tokens endpoint.
#[derive(Template)]
#[template(path = "callback.html")]
pub(crate) struct CallbackTemplate {
    pub(crate) keys: StorageKeys,
    pub(crate) token_endpoint: String,
    pub(crate) client_id: String,
    pub(crate) redirect_uri: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub(crate) struct DashboardTemplate;

#[derive(Template)]
#[template(path = "error_page.html")]
pub(crate) struct ErrorPageTemplate {
    pub(crate) report: ErrorReport,
}

pub(crate) fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render template: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
        }
    }
}
