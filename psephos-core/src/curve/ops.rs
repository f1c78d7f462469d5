//! The curve capability trait.
//!
//! Each supported curve implements [`Curve`] with its concrete scalar and
//! point types; everything the primitives need — sampling, scalar/point
//! arithmetic, digit-string and compressed-point codecs — is reachable
//! through this one trait. Callers never see the backing crates.

use group::ff::{Field, PrimeField};
use group::Group;
use rand_core::{CryptoRng, RngCore};

use super::digits::{self, Radix};
use super::CurveId;
use crate::error::{CryptoError, Result};
use crate::model::GroupElem;

/// Capability contract for one NIST curve.
pub trait Curve: Copy + Clone + Send + Sync + 'static {
    /// Scalar field element, mod the group order q.
    type Scalar: PrimeField;
    /// Curve point with scalar multiplication.
    type Point: Group<Scalar = Self::Scalar>;

    /// Identifier carried on the wire.
    const ID: CurveId;
    /// Bits drawn for a uniformly sampled scalar; always below the order.
    const RAND_BITS: usize;
    /// Byte length of one base-field coordinate.
    const FIELD_BYTES: usize;

    /// Encode a point in compressed form (x digits + y parity).
    fn elem_encode(point: &Self::Point) -> GroupElem;

    /// Decode a compressed point; fails on off-curve coordinates.
    fn elem_decode(elem: &GroupElem) -> Result<Self::Point>;

    /// Uncompressed SEC1 bytes, for constant-time comparison.
    fn point_bytes(point: &Self::Point) -> Vec<u8>;

    /// Sample a uniform scalar of `RAND_BITS` bits.
    fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        let mut repr = <Self::Scalar as PrimeField>::Repr::default();
        loop {
            rng.fill_bytes(repr.as_mut());
            mask_excess(repr.as_mut(), Self::RAND_BITS);
            // A RAND_BITS-bit value is always below q.
            if let Some(scalar) = Option::<Self::Scalar>::from(Self::Scalar::from_repr(repr)) {
                return scalar;
            }
        }
    }

    /// Base-64 digit string of a scalar.
    fn scalar_digits(scalar: &Self::Scalar) -> String {
        digits::encode(scalar.to_repr().as_ref(), Radix::Base64)
    }

    /// Parse a digit string into a scalar, folding mod q.
    fn scalar_from_digits(text: &str, radix: Radix) -> Result<Self::Scalar> {
        if text.is_empty() {
            return Err(CryptoError::EmptyNumber);
        }
        let base = Self::Scalar::from(u64::from(radix.value()));
        let mut acc = Self::Scalar::ZERO;
        for c in text.chars() {
            let digit = digits::digit_value(c, radix)
                .ok_or(CryptoError::InvalidDigit(c, radix.value()))?;
            acc = acc * base + Self::Scalar::from(u64::from(digit));
        }
        Ok(acc)
    }
}

/// Zero the top `len*8 - bits` bits of a big-endian byte string.
fn mask_excess(bytes: &mut [u8], bits: usize) {
    let excess = bytes.len() * 8 - bits;
    for byte in bytes.iter_mut().take(excess / 8) {
        *byte = 0;
    }
    if excess % 8 != 0 {
        bytes[excess / 8] &= 0xff >> (excess % 8);
    }
}
