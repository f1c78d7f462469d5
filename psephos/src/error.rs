use std::io;
use thiserror::Error;

use psephos_core::CryptoError;
use psephos_wire::WireError;

/// Server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bad CLI option, address family or pool size.
    #[error("{0}")]
    InvalidArgument(String),

    /// Socket or thread-spawn failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Protocol failure on a connection.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A primitive rejected its inputs.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A ballot request asking for more copies than one task may carry.
    #[error("ballot count {0} out of range")]
    BallotCountRange(u32),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
