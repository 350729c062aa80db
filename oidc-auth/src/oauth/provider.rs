//! OAuth provider trait and types.

use async_trait::async_trait;

use super::pkce::{PkceChallenge, PkceVerifier};
use super::token::TokenSet;
use crate::error::Error;

/// Authorization request with URL and the data persisted for the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user agent to.
    pub url: String,
    /// State parameter sent with the request.
    pub state: String,
    /// PKCE verifier stored for the later code exchange.
    pub pkce_verifier: PkceVerifier,
    /// Issue time in milliseconds since epoch, as written to storage.
    pub issued_at_millis: i64,
}

/// Parameters that vary per authorization request.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationParams<'a> {
    pub state: &'a str,
    pub pkce_challenge: &'a PkceChallenge,
    /// Pre-fills the user identifier on the provider side (usually an email).
    pub login_hint: Option<&'a str>,
}

/// Trait for OAuth 2.0 providers.
///
/// Implementations handle:
/// - Authorization URL generation with PKCE
/// - Authorization code exchange for tokens
#[async_trait]
pub trait Provider: Send + Sync {
    /// Build the authorization URL for the given request parameters.
    fn authorization_url(&self, params: AuthorizationParams<'_>) -> Result<String, Error>;

    /// Exchange authorization code for tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from OAuth callback
    /// * `pkce_verifier` - PKCE code verifier of the matching authorization request
    async fn exchange_code(&self, code: &str, pkce_verifier: &PkceVerifier)
        -> Result<TokenSet, Error>;
}
