//! The reqwest client used for provider calls.
//!
//! Failed requests are never retried: a network failure during the token
//! exchange ends the login attempt and the user starts over.

use std::time::Duration;

/// Timeout applied when the caller sets none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn user_agent() -> String {
    format!("oidc-auth/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound every provider request, including connect and body read.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn build(self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(user_agent())
            .timeout(self.timeout)
            .build()
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
