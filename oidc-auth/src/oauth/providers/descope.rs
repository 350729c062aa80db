//! Descope OAuth provider implementation.

use async_trait::async_trait;
use log::*;
use serde::Deserialize;
use url::Url;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::{ExchangeRequest, TokenSet};
use crate::oauth::{AuthorizationParams, PkceVerifier};

/// Host used when the project id carries no region.
pub const DEFAULT_BASE_URL: &str = "https://api.descope.com";

const AUTHORIZE_PATH: &str = "/oauth2/v1/authorize";
const TOKEN_PATH: &str = "/oauth2/v1/token";
const DEFAULT_SCOPE: &str = "openid";
const DEFAULT_EXCHANGE_ERROR: &str = "Failed to exchange authorization code for tokens";

/// Project ids of this length or longer encode a region in characters 1..5.
const REGIONAL_PROJECT_ID_LENGTH: usize = 32;

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Base URL of the Descope API for a project.
///
/// Regional projects are served from `api.<region>.descope.com`, where the
/// region is characters 1..5 of the project id.
pub fn base_url_for_project(project_id: &str) -> String {
    if project_id.len() >= REGIONAL_PROJECT_ID_LENGTH {
        if let Some(region) = project_id.get(1..5) {
            return format!("https://api.{}.descope.com", region);
        }
    }
    DEFAULT_BASE_URL.to_string()
}

/// Descope OAuth provider.
///
/// Handles OAuth 2.0 flows for Descope projects:
/// - Authorization URL generation with PKCE, flow selection and login hints
/// - Authorization code exchange
pub struct Provider {
    base_url: String,
    client_id: String,
    redirect_uri: String,
    scope: String,
    flow_id: Option<String>,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a provider talking to `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of the Descope API
    /// * `client_id` - OAuth client id
    /// * `redirect_uri` - Callback URI registered with the project
    /// * `http_client` - Client used for the token exchange
    pub fn new(
        base_url: String,
        client_id: String,
        redirect_uri: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            redirect_uri,
            scope: DEFAULT_SCOPE.to_string(),
            flow_id: None,
            http_client,
        }
    }

    /// Set the requested scope (space separated).
    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = scope;
        self
    }

    /// Select the Descope flow the authorization endpoint runs.
    pub fn with_flow_id(mut self, flow_id: Option<String>) -> Self {
        self.flow_id = flow_id;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn authorization_endpoint(&self) -> String {
        format!("{}{}", self.base_url, AUTHORIZE_PATH)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn authorization_url(&self, params: AuthorizationParams<'_>) -> Result<String, Error> {
        let mut url = Url::parse(&self.authorization_endpoint())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("scope", &self.scope)
                .append_pair("code_challenge", params.pkce_challenge.as_str())
                .append_pair("code_challenge_method", params.pkce_challenge.method())
                .append_pair("state", params.state);
            if let Some(flow_id) = &self.flow_id {
                query.append_pair("flow_id", flow_id);
            }
            if let Some(login_hint) = params.login_hint {
                query.append_pair("login_hint", login_hint);
            }
        }
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &PkceVerifier,
    ) -> Result<TokenSet, Error> {
        let request = ExchangeRequest::authorization_code(
            code,
            &self.client_id,
            pkce_verifier.as_str(),
            &self.redirect_uri,
        );

        debug!("Exchanging Descope authorization code for tokens");

        let response = self
            .http_client
            .post(self.token_endpoint())
            .json(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach Descope token endpoint: {:?}", e))?;

        let status = response.status();
        if status.is_success() {
            let tokens: TokenSet = response.json().await.map_err(|e| {
                warn!("Failed to parse Descope token response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
                }
            })?;
            info!("Successfully exchanged Descope authorization code for tokens");
            Ok(tokens)
        } else {
            let body = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| {
                    warn!(
                        "Descope token exchange rejected ({}): {}",
                        status,
                        e.error.as_deref().unwrap_or("unknown error")
                    );
                    e.error_description
                })
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_EXCHANGE_ERROR.to_string());
            Err(oauth_error(OAuthErrorKind::TokenExchangeFailed, &description))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use crate::ErrorKind;
    use mockito::{Matcher, Server};
    use secrecy::ExposeSecret;

    const REDIRECT_URI: &str = "http://localhost:4000/api/auth/callback";

    fn provider(base_url: &str) -> Provider {
        Provider::new(
            base_url.to_string(),
            "client-123".to_string(),
            REDIRECT_URI.to_string(),
            reqwest::Client::new(),
        )
    }

    fn verifier() -> PkceVerifier {
        PkceVerifier::parse(&"v".repeat(64)).unwrap()
    }

    #[test]
    fn test_base_url_for_short_project_id() {
        assert_eq!(base_url_for_project("P2abc"), DEFAULT_BASE_URL);
        assert_eq!(base_url_for_project(""), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_url_for_regional_project_id() {
        let project_id = "Puse12aAc4T2V93bddihGEx2Ryhc8e5Z";
        assert_eq!(project_id.len(), 32);
        assert_eq!(
            base_url_for_project(project_id),
            "https://api.use1.descope.com"
        );
    }

    #[test]
    fn test_authorization_url_carries_pkce_parameters() {
        let provider = provider(DEFAULT_BASE_URL).with_flow_id(Some("sign-in-magic-link".into()));
        let verifier = verifier();
        let challenge = verifier.challenge();

        let url = provider
            .authorization_url(AuthorizationParams {
                state: "state-1",
                pkce_challenge: &challenge,
                login_hint: Some("jane+test@example.com"),
            })
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("api.descope.com"));
        assert_eq!(parsed.path(), "/oauth2/v1/authorize");
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["redirect_uri"], REDIRECT_URI);
        assert_eq!(pairs["scope"], "openid");
        assert_eq!(pairs["code_challenge"], challenge.as_str());
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(pairs["state"], "state-1");
        assert_eq!(pairs["flow_id"], "sign-in-magic-link");
        assert_eq!(pairs["login_hint"], "jane+test@example.com");
        assert!(!url.contains(verifier.as_str()));
    }

    #[test]
    fn test_authorization_url_omits_optional_parameters() {
        let verifier = verifier();
        let url = provider(DEFAULT_BASE_URL)
            .authorization_url(AuthorizationParams {
                state: "s",
                pkce_challenge: &verifier.challenge(),
                login_hint: None,
            })
            .unwrap();

        assert!(!url.contains("flow_id="));
        assert!(!url.contains("login_hint="));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/v1/token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "grant_type": "authorization_code",
                "code": "auth-code",
                "client_id": "client-123",
                "code_verifier": "v".repeat(64),
                "redirect_uri": REDIRECT_URI
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"a","id_token":"i","refresh_token":"r","expires_in":1800}"#)
            .create_async()
            .await;

        let tokens = provider(&server.url())
            .exchange_code("auth-code", &verifier())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token.unwrap().expose_secret(), "a");
        assert_eq!(tokens.expires_in, Some(1800));
    }

    #[tokio::test]
    async fn test_exchange_code_surfaces_provider_description() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v1/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Code has expired"}"#)
            .create_async()
            .await;

        let err = provider(&server.url())
            .exchange_code("stale", &verifier())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert_eq!(err.message().as_deref(), Some("Code has expired"));
    }

    #[tokio::test]
    async fn test_exchange_code_default_description_for_opaque_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v1/token")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = provider(&server.url())
            .exchange_code("code", &verifier())
            .await
            .unwrap_err();

        assert_eq!(err.message().as_deref(), Some(DEFAULT_EXCHANGE_ERROR));
    }

    #[tokio::test]
    async fn test_exchange_code_unparseable_success_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/v1/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = provider(&server.url())
            .exchange_code("code", &verifier())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidResponse));
    }
}
