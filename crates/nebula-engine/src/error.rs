use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the command engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend rejected an `invoke` call.
    #[error("Backend call {method} failed: {message}")]
    Backend {
        /// Method name on the wire.
        method: &'static str,
        /// Rejection message reported by the backend.
        message: String,
    },

    /// Command arguments could not be encoded.
    #[error("Failed to encode arguments: {0}")]
    Encode(#[from] serde_json::Error),

    /// The key input loop has shut down.
    #[error("Key input channel closed")]
    ChannelClosed,
}
