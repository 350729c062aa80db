//! Transient state for an in-flight login attempt.
//!
//! The verifier has to survive a full navigation to the provider and back, so it
//! lives in a key-value store scoped to one user agent: written before the
//! redirect, read and deleted when the callback arrives.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::OsRng;
use rand::Rng;

use super::pkce::PkceVerifier;

/// Storage key for the PKCE code verifier.
pub const CODE_VERIFIER_KEY: &str = "oidc_code_verifier";
/// Storage key for the attempt's issue timestamp (milliseconds since epoch).
pub const TIMESTAMP_KEY: &str = "oidc_timestamp";
/// Storage key for the locally generated state parameter.
pub const STATE_KEY: &str = "oidc_state";

/// Every key a login attempt writes.
pub const TRANSIENT_KEYS: [&str; 3] = [CODE_VERIFIER_KEY, TIMESTAMP_KEY, STATE_KEY];

/// A key-value store private to one user agent.
///
/// Removal is best effort and never reports failure.
pub trait TransientStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store, one instance per user agent.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TransientStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// What a login attempt leaves behind in transient storage.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    /// PKCE verifier matching the challenge that was sent.
    pub code_verifier: PkceVerifier,
    /// State parameter sent with the authorization request.
    pub state: Option<String>,
    /// When the attempt was started.
    pub issued_at: Option<DateTime<Utc>>,
}

impl PendingLogin {
    /// Start a new attempt around `code_verifier` with a fresh state token.
    pub fn new(code_verifier: PkceVerifier) -> Self {
        Self {
            code_verifier,
            state: Some(generate_state()),
            issued_at: Some(Utc::now()),
        }
    }

    /// Replace whatever attempt the store held with this one.
    pub fn persist<S: TransientStore + ?Sized>(&self, store: &mut S) {
        Self::clear(store);
        store.set(CODE_VERIFIER_KEY, self.code_verifier.as_str().to_string());
        if let Some(issued_at) = self.issued_at {
            store.set(TIMESTAMP_KEY, issued_at.timestamp_millis().to_string());
        }
        if let Some(state) = &self.state {
            store.set(STATE_KEY, state.clone());
        }
    }

    /// Read the attempt and delete it from the store.
    ///
    /// Returns `None` when no usable verifier is stored. The store is cleared
    /// either way.
    pub fn take<S: TransientStore + ?Sized>(store: &mut S) -> Option<Self> {
        let verifier = store.get(CODE_VERIFIER_KEY);
        let state = store.get(STATE_KEY);
        let issued_at = store
            .get(TIMESTAMP_KEY)
            .and_then(|millis| millis.parse::<i64>().ok())
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
        Self::clear(store);

        let code_verifier = PkceVerifier::parse(&verifier?)
            .inspect_err(|e| log::warn!("Discarding malformed stored verifier: {}", e))
            .ok()?;

        Some(Self {
            code_verifier,
            state,
            issued_at,
        })
    }

    /// Remove every key a login attempt writes.
    pub fn clear<S: TransientStore + ?Sized>(store: &mut S) {
        for key in TRANSIENT_KEYS {
            store.remove(key);
        }
    }

    /// Whether the state returned by the provider is the one this attempt sent.
    pub fn state_matches(&self, returned: Option<&str>) -> bool {
        match (self.state.as_deref(), returned) {
            (Some(expected), Some(returned)) => expected == returned,
            _ => false,
        }
    }
}

/// Generate a cryptographically random state token.
fn generate_state() -> String {
    let random_bytes: [u8; 32] = OsRng.gen();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_hex_state() {
        let pending = PendingLogin::new(PkceVerifier::generate());
        let state = pending.state.unwrap();
        assert_eq!(state.len(), 64); // 32 bytes hex encoded
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_persist_then_take_round_trips_and_clears() {
        let mut store = MemoryStore::default();
        let pending = PendingLogin::new(PkceVerifier::generate());
        pending.persist(&mut store);

        assert_eq!(
            store.get(CODE_VERIFIER_KEY).as_deref(),
            Some(pending.code_verifier.as_str())
        );
        assert!(store.get(TIMESTAMP_KEY).is_some());

        let taken = PendingLogin::take(&mut store).unwrap();
        assert_eq!(taken.code_verifier, pending.code_verifier);
        assert_eq!(taken.state, pending.state);
        assert_eq!(
            taken.issued_at.map(|t| t.timestamp_millis()),
            pending.issued_at.map(|t| t.timestamp_millis())
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_without_verifier_returns_none() {
        let mut store = MemoryStore::default();
        store.set(STATE_KEY, "abc".to_string());

        assert!(PendingLogin::take(&mut store).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_overwrites_previous_attempt() {
        let mut store = MemoryStore::default();
        let first = PendingLogin::new(PkceVerifier::generate());
        let second = PendingLogin::new(PkceVerifier::generate());
        first.persist(&mut store);
        second.persist(&mut store);

        let taken = PendingLogin::take(&mut store).unwrap();
        assert_eq!(taken.code_verifier, second.code_verifier);
        assert_eq!(taken.state, second.state);
    }

    #[test]
    fn test_state_matches() {
        let pending = PendingLogin::new(PkceVerifier::generate());
        let state = pending.state.clone().unwrap();

        assert!(pending.state_matches(Some(&state)));
        assert!(!pending.state_matches(Some("other")));
        assert!(!pending.state_matches(None));
    }

    #[test]
    fn test_state_matches_fails_when_nothing_was_stored() {
        let mut pending = PendingLogin::new(PkceVerifier::generate());
        pending.state = None;
        assert!(!pending.state_matches(Some("anything")));
    }
}
