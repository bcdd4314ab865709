//! Error types for ldleak

use std::path::PathBuf;
use thiserror::Error;

/// ldleak error type
///
/// Every variant except `Io` raised inside the header scan is fatal to a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("path {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("the definition for {0} could not be found")]
    SymbolNotFound(String),

    #[error("Parse error in declaration of {symbol}: {reason}")]
    ParseFailure { symbol: String, reason: String },

    #[error(
        "... in the function signature of {symbol} is only supported after exactly one \
         parameter ({named} found)"
    )]
    UnsupportedVariadic { symbol: String, named: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a [`Error::ParseFailure`]
    pub fn parse(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ParseFailure {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for ldleak
pub type Result<T> = std::result::Result<T, Error>;
