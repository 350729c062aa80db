use super::TokenSet;
use crate::error::Error;

/// Destination for the tokens of a completed login.
///
/// Implementations either accept the whole set or return an error having
/// persisted nothing.
pub trait SessionWriter {
    fn write(&mut self, tokens: &TokenSet) -> Result<(), Error>;
}
