//! # oidc-auth
//!
//! Client side of the OAuth 2.0 / OIDC authorization code flow with PKCE:
//! - PKCE verifier and S256 challenge generation
//! - Per-user-agent transient storage of the in-flight login attempt
//! - Provider abstraction with a Descope implementation
//! - Token exchange and the hand-off of issued tokens to a session writer
//! - HTTP client building
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oidc_auth::oauth::{flow, providers::descope, MemoryStore};
//!
//! let provider = descope::Provider::new(
//!     descope::base_url_for_project(project_id),
//!     client_id,
//!     redirect_uri,
//!     http_client,
//! );
//! let mut store = MemoryStore::default();
//! let request = flow::begin(&provider, &mut store, Some("user@example.com"), 64)?;
//! // redirect the user agent to request.url, then on callback:
//! flow::complete(&provider, &mut store, &mut writer, &code, state.as_deref()).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
