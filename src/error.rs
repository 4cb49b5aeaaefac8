//! Error types for rule validation and text input parsing.
//!
//! Illegal game actions are not errors: `Board::make_move` and friends signal
//! them through their return values.

use thiserror::Error;

/// Main error type of the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid rules: {message}")]
    InvalidRules { message: String },

    #[error("invalid coordinate '{input}' (expected 'x,y' or 'x y')")]
    InvalidCoordinate { input: String },

    #[error("invalid player '{input}' (expected 'x' or 'o')")]
    InvalidPlayer { input: String },
}

/// Convenience alias for results using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
