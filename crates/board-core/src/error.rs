//! Parse errors for the typed string conversions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square key: {0}")]
    InvalidSquare(String),

    #[error("invalid piece letter: {0}")]
    InvalidRole(char),

    #[error("invalid color: {0}")]
    InvalidColor(String),
}
