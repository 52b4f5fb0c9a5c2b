/// Card values, suits and tokens.
mod card;
/// Export `Card`, `Value` and `Suit`
pub use self::card::{Card, Suit, Value};

/// Parse errors for card tokens.
mod error;
/// Export `CardParseError`
pub use self::error::CardParseError;
