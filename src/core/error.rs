use thiserror::Error;

/// Errors produced while reading card tokens off the table.
#[derive(Error, Debug, PartialEq, Eq, Clone, Hash)]
pub enum CardParseError {
    #[error("Unable to parse value from {0:?}")]
    UnexpectedValueChar(char),
    #[error("Unable to parse suit from {0:?}")]
    UnexpectedSuitChar(char),
    #[error("Card token {0:?} is not a rank followed by a suit")]
    MalformedToken(String),
}
