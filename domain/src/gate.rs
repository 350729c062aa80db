//! Page access decisions based on the access token cookie.
//!
//! Only the `exp` claim is consulted. Signatures, issuer and audience are not
//! verified, so this gate is a convenience for page routing and not an
//! authorization check.

use jsonwebtoken::{decode, DecodingKey, Validation};
use log::*;
use serde::Deserialize;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Where a page request should go.
#[derive(Debug, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(&'static str),
}

/// Whether `token` is past its `exp` at `now` (seconds since epoch).
///
/// A token that cannot be decoded counts as expired; one without `exp` does not.
pub fn is_access_token_expired(token: &str, now: i64) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.is_some_and(|exp| exp < now),
        Err(e) => {
            debug!("Access token could not be decoded: {}", e);
            true
        }
    }
}

/// Decide what to do with a request for `path`.
pub fn evaluate(path: &str, access_token: Option<&str>, now: i64) -> GateDecision {
    let has_live_session = access_token
        .filter(|token| !token.is_empty())
        .is_some_and(|token| !is_access_token_expired(token, now));

    match path {
        HOME_PATH if has_live_session => GateDecision::Redirect(DASHBOARD_PATH),
        DASHBOARD_PATH if !has_live_session => GateDecision::Redirect(LOGIN_PATH),
        _ => GateDecision::Continue,
    }
}
