//! Curve identifiers and the capability surface.
//!
//! The five NIST prime curves are process-wide immutables; a [`CurveId`]
//! travels on the wire and resolves to a concrete backend through
//! [`with_curve!`](crate::with_curve).

use std::fmt;

pub mod digits;
mod nist;
mod ops;

pub use nist::{P192, P224, P256, P384, P521};
pub use ops::Curve;

/// One of the five supported NIST prime curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveId {
    P192,
    P224,
    P256,
    P384,
    P521,
}

impl CurveId {
    /// All curves, in wire order.
    pub const ALL: [CurveId; 5] = [
        CurveId::P192,
        CurveId::P224,
        CurveId::P256,
        CurveId::P384,
        CurveId::P521,
    ];

    /// Resolve a wire tag (0..=4).
    pub fn from_wire(tag: u8) -> crate::Result<Self> {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or(crate::CryptoError::CurveOutOfRange(tag))
    }

    /// Wire tag of this curve.
    pub const fn wire(self) -> u8 {
        self as u8
    }

    /// Bits drawn for a uniform scalar sample; strictly below the order.
    pub const fn rand_bits(self) -> usize {
        match self {
            CurveId::P192 => 191,
            CurveId::P224 => 223,
            CurveId::P256 => 255,
            CurveId::P384 => 383,
            CurveId::P521 => 520,
        }
    }

    /// Byte length of one base-field coordinate.
    pub const fn field_bytes(self) -> usize {
        match self {
            CurveId::P192 => 24,
            CurveId::P224 => 28,
            CurveId::P256 => 32,
            CurveId::P384 => 48,
            CurveId::P521 => 66,
        }
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveId::P192 => "P-192",
            CurveId::P224 => "P-224",
            CurveId::P256 => "P-256",
            CurveId::P384 => "P-384",
            CurveId::P521 => "P-521",
        };
        f.write_str(name)
    }
}

/// Dispatch a runtime [`CurveId`] to its concrete backend type.
///
/// ```
/// use psephos_core::{curve::{Curve, CurveId}, with_curve};
///
/// let id = CurveId::P256;
/// let bits = with_curve!(id, C => C::RAND_BITS);
/// assert_eq!(bits, 255);
/// ```
#[macro_export]
macro_rules! with_curve {
    ($id:expr, $C:ident => $body:expr) => {
        match $id {
            $crate::curve::CurveId::P192 => {
                type $C = $crate::curve::P192;
                $body
            }
            $crate::curve::CurveId::P224 => {
                type $C = $crate::curve::P224;
                $body
            }
            $crate::curve::CurveId::P256 => {
                type $C = $crate::curve::P256;
                $body
            }
            $crate::curve::CurveId::P384 => {
                type $C = $crate::curve::P384;
                $body
            }
            $crate::curve::CurveId::P521 => {
                type $C = $crate::curve::P521;
                $body
            }
        }
    };
}
