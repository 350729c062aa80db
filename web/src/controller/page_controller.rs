use axum::extract::Query;
use axum::response::Response;
use domain::error_code::{heading, ErrorReport};
use serde::Deserialize;

use crate::templates::{
    render, Banner, DashboardTemplate, ErrorPageTemplate, HomeTemplate, LoginTemplate,
    STORAGE_KEYS,
};

/// `error`/`error_description` pair carried by the login and error pages.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorParams {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub async fn home() -> Response {
    render(&HomeTemplate)
}

pub async fn login(Query(params): Query<ErrorParams>) -> Response {
    let banner = params
        .error
        .as_deref()
        .filter(|error| !error.is_empty())
        .map(|error| Banner {
            heading: heading(error),
            description: params
                .error_description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| {
                    "An error occurred during authentication. Please try again.".to_string()
                }),
        });

    render(&LoginTemplate {
        keys: STORAGE_KEYS,
        banner,
    })
}

pub async fn dashboard() -> Response {
    render(&DashboardTemplate)
}

pub async fn error_page(Query(params): Query<ErrorParams>) -> Response {
    let report = ErrorReport::new(
        params.error.as_deref(),
        params.error_description.as_deref(),
    );
    render(&ErrorPageTemplate { report })
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let app = define_routes(test_support::app_state(test_support::config(&[])));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_error_page_shows_heading_description_and_help() {
        let (status, body) = get_body(
            "/error-page?error=missing_code_verifier&error_description=Code+verifier+not+found",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("MISSING CODE VERIFIER"));
        assert!(body.contains("Code verifier not found"));
        assert!(body.contains("Troubleshooting Help:"));
    }

    #[tokio::test]
    async fn test_error_page_without_error() {
        let (_, body) = get_body("/error-page").await;
        assert!(body.contains("An unknown error occurred during the authentication process."));
        assert!(!body.contains("Troubleshooting Help:"));
    }

    #[tokio::test]
    async fn test_error_page_escapes_description() {
        let (_, body) =
            get_body("/error-page?error=access_denied&error_description=%3Cscript%3E").await;
        assert!(!body.contains("<p><script>"));
        assert!(body.contains("<p>&#60;script&#62;</p>") || body.contains("<p>&lt;script&gt;</p>"));
    }

    #[tokio::test]
    async fn test_login_page_shows_error_banner() {
        let (status, body) =
            get_body("/login?error=authentication_failed&error_description=Bad+code").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("AUTHENTICATION FAILED"));
        assert!(body.contains("Bad code"));
        assert!(body.contains("Try Again"));
    }

    #[tokio::test]
    async fn test_login_page_without_error_has_no_banner() {
        let (_, body) = get_body("/login").await;
        assert!(!body.contains("Try Again"));
        assert!(body.contains("action=\"/login/start\""));
    }
}
