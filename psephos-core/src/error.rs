use thiserror::Error;

/// Errors raised by the cryptographic primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A curve identifier outside the five supported NIST curves.
    #[error("curve identifier {0} out of range")]
    CurveOutOfRange(u8),

    /// Inputs to a slot-wise operation disagree on shape, or are empty.
    #[error("operands have mismatched shapes")]
    ShapeMismatch,

    /// A transmitted coordinate does not decode to a curve point.
    #[error("invalid curve point")]
    InvalidPoint,

    /// A transmitted number contains a digit outside its radix.
    #[error("invalid digit {0:?} for radix {1}")]
    InvalidDigit(char, u8),

    /// A transmitted number is the empty string.
    #[error("empty number")]
    EmptyNumber,

    /// A request parameter outside its meaningful range.
    #[error("invalid parameter: {0}")]
    Parameter(&'static str),
}

/// Result type alias for primitive operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
