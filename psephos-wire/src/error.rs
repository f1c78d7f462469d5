use std::io;
use thiserror::Error;

/// Protocol-layer errors.
#[derive(Debug, Error)]
pub enum WireError {
    /// Underlying socket error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Peer shut down before the transfer completed.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The aggregate transfer budget was exceeded.
    #[error("transfer timed out")]
    Timeout,

    /// A frame length outside [1, 2^24].
    #[error("frame length {0} out of range")]
    FrameLength(u64),

    /// A payload that does not decode against the schema.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// A request tag outside the six known commands.
    #[error("unknown command tag {0}")]
    UnknownCommand(u8),
}

impl WireError {
    /// Shorthand for a decode failure with a message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<psephos_core::CryptoError> for WireError {
    fn from(err: psephos_core::CryptoError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, WireError>;
