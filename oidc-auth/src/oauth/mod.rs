//! OAuth 2.0 authorization code flow with PKCE.

mod pkce;
mod provider;
mod state;

pub mod flow;
pub mod providers;
pub mod token;

pub use pkce::{
    PkceChallenge, PkceVerifier, CHALLENGE_METHOD, DEFAULT_VERIFIER_LENGTH, MAX_VERIFIER_LENGTH,
    MIN_VERIFIER_LENGTH,
};
pub use provider::{AuthorizationParams, AuthorizationRequest, Provider};
pub use state::{
    MemoryStore, PendingLogin, TransientStore, CODE_VERIFIER_KEY, STATE_KEY, TIMESTAMP_KEY,
    TRANSIENT_KEYS,
};
