//! Error handling for the keyreplay crate.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for keyreplay operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that stop a replay.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Settings could not be loaded.
    #[error("Configuration error: {}", .0.pretty())]
    Config(#[from] config::Error),
    /// A script line is not a valid directive.
    #[error("line {line}: {message}")]
    Script {
        /// 1-based script line.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
    /// Output could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Helper to build a script error.
    pub fn script<M: Into<String>>(line: usize, msg: M) -> Self {
        Self::Script {
            line,
            message: msg.into(),
        }
    }
}
