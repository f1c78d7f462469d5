//! Concrete curve backends.
//!
//! One zero-sized marker type per NIST curve, wired to the corresponding
//! RustCrypto arithmetic crate. The SEC1 codec lives here because the
//! encoded-point types are concrete per curve; everything else comes from
//! the trait's generic defaults.

use elliptic_curve::sec1::{FromEncodedPoint, Tag, ToEncodedPoint};
use group::Group;

use super::digits::{self, Radix};
use super::ops::Curve;
use super::CurveId;
use crate::error::{CryptoError, Result};
use crate::model::GroupElem;

macro_rules! nist_curve {
    ($name:ident, $lib:ident, $id:expr, $rand_bits:expr, $field_bytes:expr) => {
        #[derive(Clone, Copy, Debug)]
        pub struct $name;

        impl Curve for $name {
            type Scalar = $lib::Scalar;
            type Point = $lib::ProjectivePoint;

            const ID: CurveId = $id;
            const RAND_BITS: usize = $rand_bits;
            const FIELD_BYTES: usize = $field_bytes;

            fn elem_encode(point: &Self::Point) -> GroupElem {
                let encoded = point.to_affine().to_encoded_point(true);
                match encoded.x() {
                    Some(x) => GroupElem {
                        x: digits::encode(x, Radix::Base64),
                        y: encoded.tag() == Tag::CompressedOddY,
                    },
                    None => GroupElem::infinity(),
                }
            }

            fn elem_decode(elem: &GroupElem) -> Result<Self::Point> {
                if elem.is_infinity() {
                    return Ok(<Self::Point as Group>::identity());
                }
                let value = digits::decode(&elem.x, Radix::Base64)?;
                if value.len() > Self::FIELD_BYTES {
                    return Err(CryptoError::InvalidPoint);
                }
                let mut sec1 = vec![0u8; 1 + Self::FIELD_BYTES];
                sec1[0] = if elem.y { 0x03 } else { 0x02 };
                sec1[1 + Self::FIELD_BYTES - value.len()..].copy_from_slice(&value);
                let encoded = $lib::EncodedPoint::from_bytes(&sec1)
                    .map_err(|_| CryptoError::InvalidPoint)?;
                let affine =
                    Option::<$lib::AffinePoint>::from($lib::AffinePoint::from_encoded_point(
                        &encoded,
                    ))
                    .ok_or(CryptoError::InvalidPoint)?;
                Ok(Self::Point::from(affine))
            }

            fn point_bytes(point: &Self::Point) -> Vec<u8> {
                point.to_affine().to_encoded_point(false).as_bytes().to_vec()
            }
        }
    };
}

nist_curve!(P192, p192, CurveId::P192, 191, 24);
nist_curve!(P224, p224, CurveId::P224, 223, 28);
nist_curve!(P256, p256, CurveId::P256, 255, 32);
nist_curve!(P384, p384, CurveId::P384, 383, 48);
nist_curve!(P521, p521, CurveId::P521, 520, 66);

#[cfg(test)]
mod tests {
    use super::*;
    use group::ff::PrimeField;
    use rand::rngs::OsRng;

    #[test]
    fn generator_matches_published_constant() {
        // SEC2 base point of P-256, uncompressed x coordinate.
        let known = hex::decode("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296")
            .unwrap();
        let encoded = P256::elem_encode(&p256::ProjectivePoint::GENERATOR);
        assert_eq!(encoded.x, digits::encode(&known, Radix::Base64));
    }

    #[test]
    fn point_codec_round_trips() {
        let mut rng = OsRng;
        let scalar = P192::sample(&mut rng);
        let point = p192::ProjectivePoint::GENERATOR * scalar;
        let decoded = P192::elem_decode(&P192::elem_encode(&point)).unwrap();
        assert_eq!(decoded, point);
    }

    #[test]
    fn infinity_round_trips() {
        let identity = p256::ProjectivePoint::IDENTITY;
        let elem = P256::elem_encode(&identity);
        assert!(elem.is_infinity());
        assert_eq!(P256::elem_decode(&elem).unwrap(), identity);
    }

    #[test]
    fn sampled_scalars_fit_their_band() {
        let mut rng = OsRng;
        for _ in 0..16 {
            let scalar = P521::sample(&mut rng);
            let repr = scalar.to_repr();
            // 520-bit band inside a 66-byte representation: top byte clear.
            assert_eq!(repr.as_ref()[0], 0);
        }
    }

    #[test]
    fn scalar_digits_round_trip() {
        let mut rng = OsRng;
        for _ in 0..8 {
            let scalar = P384::sample(&mut rng);
            let text = P384::scalar_digits(&scalar);
            assert_eq!(P384::scalar_from_digits(&text, Radix::Base64).unwrap(), scalar);
        }
    }

    #[test]
    fn parsing_folds_mod_order() {
        // q + 1 must parse to 1: feed the order's hex plus a final fold.
        let order = p256::Scalar::MODULUS.trim_start_matches("0x");
        let parsed = P256::scalar_from_digits(order, Radix::Hex).unwrap();
        assert_eq!(parsed, p256::Scalar::ZERO);
    }

    #[test]
    fn rejects_oversized_coordinates() {
        let elem = GroupElem {
            x: digits::encode(&[0xff; 40], Radix::Base64),
            y: false,
        };
        assert!(matches!(P192::elem_decode(&elem), Err(CryptoError::InvalidPoint)));
    }
}
