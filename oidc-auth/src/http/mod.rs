//! HTTP client building.

mod client;

pub use client::{HttpClientBuilder, DEFAULT_TIMEOUT};
