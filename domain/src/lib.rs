//! Use cases of the demo: starting and finishing a login, turning tokens into
//! session cookies and gating page access on the session.

pub use oidc_auth::oauth::providers::descope::Provider as DescopeProvider;
pub use oidc_auth::oauth::{
    AuthorizationRequest, MemoryStore, TransientStore, CODE_VERIFIER_KEY, STATE_KEY,
    TIMESTAMP_KEY, TRANSIENT_KEYS,
};

pub mod error;
pub mod error_code;
pub mod gate;
pub mod login;
pub mod session;
