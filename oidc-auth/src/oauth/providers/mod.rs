//! OAuth provider implementations.

pub mod descope;
