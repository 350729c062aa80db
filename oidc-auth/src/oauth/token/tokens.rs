//! OAuth token types.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Tokens returned by a successful authorization code exchange.
///
/// Every field is optional on the wire; whoever persists the set decides
/// which ones it requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests.
    pub access_token: Option<SecretString>,
    /// OIDC ID token asserting the user's identity.
    pub id_token: Option<SecretString>,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// Lifetime of the access and ID tokens in seconds. Fractions are truncated.
    #[serde(default, deserialize_with = "whole_seconds")]
    pub expires_in: Option<i64>,
    /// Token type (usually "Bearer").
    pub token_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(i64),
    Fractional(f64),
}

fn whole_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Seconds>::deserialize(deserializer)?.map(|seconds| match seconds {
        Seconds::Whole(seconds) => seconds,
        Seconds::Fractional(seconds) => seconds.trunc() as i64,
    }))
}

/// JSON body POSTed to the provider's token endpoint.
#[derive(Debug, Serialize)]
pub struct ExchangeRequest<'a> {
    pub grant_type: &'static str,
    pub code: &'a str,
    pub client_id: &'a str,
    pub code_verifier: &'a str,
    pub redirect_uri: &'a str,
}

impl<'a> ExchangeRequest<'a> {
    pub fn authorization_code(
        code: &'a str,
        client_id: &'a str,
        code_verifier: &'a str,
        redirect_uri: &'a str,
    ) -> Self {
        Self {
            grant_type: "authorization_code",
            code,
            client_id,
            code_verifier,
            redirect_uri,
        }
    }
}
