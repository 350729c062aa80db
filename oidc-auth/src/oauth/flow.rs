//! The authorization code exchange sequence.
//!
//! `begin` runs before the user agent leaves for the provider; `complete` runs
//! when it comes back to the callback URI. Between the two the only shared data
//! is what `begin` left in the user agent's [`TransientStore`].

use chrono::Utc;
use log::*;

use super::{
    AuthorizationParams, AuthorizationRequest, PendingLogin, PkceVerifier, Provider,
    TransientStore,
};
use crate::error::{oauth_error, storage_error, Error, OAuthErrorKind};
use crate::oauth::token::SessionWriter;

/// Start a login attempt.
///
/// Generates the verifier and state, replaces any attempt already held in
/// `store`, and returns the authorization URL to navigate to.
pub fn begin<P, S>(
    provider: &P,
    store: &mut S,
    login_hint: Option<&str>,
    verifier_length: usize,
) -> Result<AuthorizationRequest, Error>
where
    P: Provider + ?Sized,
    S: TransientStore + ?Sized,
{
    let pkce_verifier = PkceVerifier::generate_with_length(verifier_length)?;
    let pkce_challenge = pkce_verifier.challenge();
    let pending = PendingLogin::new(pkce_verifier);
    let state = pending.state.clone().unwrap_or_default();

    let url = provider.authorization_url(AuthorizationParams {
        state: &state,
        pkce_challenge: &pkce_challenge,
        login_hint,
    })?;

    pending.persist(store);
    debug!("Stored PKCE verifier and state for new login attempt");

    Ok(AuthorizationRequest {
        url,
        state,
        issued_at_millis: pending
            .issued_at
            .map(|t| t.timestamp_millis())
            .unwrap_or_default(),
        pkce_verifier: pending.code_verifier,
    })
}

/// Finish a login attempt from the callback's authorization code.
///
/// The stored attempt is consumed whatever the outcome. Nothing reaches the
/// token endpoint unless a verifier was found and the returned state matches.
pub async fn complete<P, S, W>(
    provider: &P,
    store: &mut S,
    writer: &mut W,
    code: &str,
    returned_state: Option<&str>,
) -> Result<(), Error>
where
    P: Provider + ?Sized,
    S: TransientStore + ?Sized,
    W: SessionWriter + ?Sized,
{
    let pending = PendingLogin::take(store).ok_or_else(|| {
        warn!("Code verifier not found in transient storage");
        oauth_error(
            OAuthErrorKind::MissingCodeVerifier,
            "Code verifier not found in storage",
        )
    })?;

    if let Some(issued_at) = pending.issued_at {
        debug!(
            "Callback received {}s after the login attempt started",
            (Utc::now() - issued_at).num_seconds()
        );
    }

    if !pending.state_matches(returned_state) {
        warn!("State returned by the provider does not match the stored login attempt");
        return Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "State parameter does not match the login attempt",
        ));
    }

    let tokens = provider.exchange_code(code, &pending.code_verifier).await?;

    writer.write(&tokens).map_err(|e| {
        warn!("Failed to store tokens from exchange: {}", e);
        storage_error(e)
    })?;

    info!("Login completed and session tokens stored");
    Ok(())
}
