//! OAuth token types and the hand-off of issued tokens to session storage.

mod tokens;
mod writer;

pub use tokens::{ExchangeRequest, TokenSet};
pub use writer::SessionWriter;
