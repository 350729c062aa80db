//! PKCE (Proof Key for Code Exchange) support for OAuth 2.0.
//!
//! Implements RFC 7636 for securing authorization code flows in public clients.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::{pkce_error, Error, PkceErrorKind};

/// Characters allowed in a verifier (RFC 7636 unreserved set).
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Shortest verifier RFC 7636 accepts.
pub const MIN_VERIFIER_LENGTH: usize = 43;
/// Longest verifier RFC 7636 accepts.
pub const MAX_VERIFIER_LENGTH: usize = 128;
/// Length used when nothing else is configured.
pub const DEFAULT_VERIFIER_LENGTH: usize = 64;

/// The only challenge method this client sends.
pub const CHALLENGE_METHOD: &str = "S256";

/// PKCE code verifier (random string).
#[derive(Debug, Clone, PartialEq)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generate a new random PKCE verifier of the default length.
    pub fn generate() -> Self {
        Self::random(DEFAULT_VERIFIER_LENGTH)
    }

    /// Generate a verifier of `length` characters drawn from the OS CSPRNG.
    pub fn generate_with_length(length: usize) -> Result<Self, Error> {
        check_length(length)?;
        Ok(Self::random(length))
    }

    /// Parse a verifier read back from storage.
    pub fn parse(verifier: &str) -> Result<Self, Error> {
        check_length(verifier.len())?;
        if !verifier.bytes().all(|b| VERIFIER_CHARSET.contains(&b)) {
            return Err(pkce_error(
                PkceErrorKind::InvalidCharacter,
                "Verifier contains characters outside the unreserved set",
            ));
        }
        Ok(Self(verifier.to_string()))
    }

    /// Get the verifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate the corresponding code challenge.
    pub fn challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self)
    }

    fn random(length: usize) -> Self {
        let mut rng = OsRng;
        let verifier = (0..length)
            .map(|_| VERIFIER_CHARSET[rng.gen_range(0..VERIFIER_CHARSET.len())] as char)
            .collect();
        Self(verifier)
    }
}

fn check_length(length: usize) -> Result<(), Error> {
    if (MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(pkce_error(
            PkceErrorKind::InvalidLength,
            &format!(
                "Verifier length {} is outside {}..={}",
                length, MIN_VERIFIER_LENGTH, MAX_VERIFIER_LENGTH
            ),
        ))
    }
}

/// PKCE code challenge (SHA256 hash of verifier).
#[derive(Debug, Clone, PartialEq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Create a code challenge from a verifier.
    ///
    /// Uses SHA256 hashing and base64url encoding without padding as per RFC 7636.
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_str().as_bytes());
        let hash = hasher.finalize();
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Get the challenge string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Challenge method to pair with this challenge in the authorization request.
    pub fn method(&self) -> &'static str {
        CHALLENGE_METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_verifier_generation() {
        let verifier = PkceVerifier::generate();
        assert_eq!(verifier.as_str().len(), DEFAULT_VERIFIER_LENGTH);
        assert!(verifier
            .as_str()
            .bytes()
            .all(|b| VERIFIER_CHARSET.contains(&b)));
    }

    #[test]
    fn test_pkce_verifier_generation_with_max_length() {
        let verifier = PkceVerifier::generate_with_length(MAX_VERIFIER_LENGTH).unwrap();
        assert_eq!(verifier.as_str().len(), 128);
    }

    #[test]
    fn test_pkce_verifier_rejects_out_of_range_length() {
        let err = PkceVerifier::generate_with_length(129).unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::Pkce(PkceErrorKind::InvalidLength)
        );
        assert!(PkceVerifier::generate_with_length(42).is_err());
    }

    #[test]
    fn test_pkce_verifiers_differ() {
        assert_ne!(PkceVerifier::generate(), PkceVerifier::generate());
    }

    #[test]
    fn test_parse_rejects_characters_outside_charset() {
        let bad = format!("{}+", "a".repeat(50));
        let err = PkceVerifier::parse(&bad).unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::Pkce(PkceErrorKind::InvalidCharacter)
        );
    }

    #[test]
    fn test_pkce_challenge_matches_rfc7636_example() {
        // Appendix B of RFC 7636
        let verifier =
            PkceVerifier::parse("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap();
        assert_eq!(
            verifier.challenge().as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_pkce_challenge_deterministic() {
        let verifier = PkceVerifier::generate();
        let challenge1 = verifier.challenge();
        let challenge2 = verifier.challenge();
        assert_eq!(challenge1.as_str(), challenge2.as_str());
    }

    #[test]
    fn test_pkce_challenge_is_unpadded_digest_length() {
        for length in [MIN_VERIFIER_LENGTH, DEFAULT_VERIFIER_LENGTH, MAX_VERIFIER_LENGTH] {
            let challenge = PkceVerifier::generate_with_length(length)
                .unwrap()
                .challenge();
            assert_eq!(challenge.as_str().len(), 43);
            assert!(!challenge.as_str().contains('='));
            assert!(!challenge.as_str().contains('+'));
            assert!(!challenge.as_str().contains('/'));
            assert_eq!(challenge.method(), "S256");
        }
    }
}
