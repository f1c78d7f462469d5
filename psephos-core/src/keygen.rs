//! ElGamal key generation.

use group::Group;
use rand::rngs::OsRng;

use crate::curve::{Curve, CurveId};
use crate::model::{Key, KeyGenData};
use crate::with_curve;

/// Smallest curve whose scalar band exceeds the election's message space,
/// m·log2(1 + N) bits for m options over N ballots.
pub fn curve_for_params(ballots: u32, options: u32) -> CurveId {
    let maxlen = f64::from(options) * (1.0 + f64::from(ballots)).log2();
    if maxlen < 191.0 {
        CurveId::P192
    } else if maxlen < 223.0 {
        CurveId::P224
    } else if maxlen < 255.0 {
        CurveId::P256
    } else if maxlen < 383.0 {
        CurveId::P384
    } else {
        CurveId::P521
    }
}

/// Generate a fresh key pair on the requested curve, or on the curve
/// derived from (N, m) when none is named.
pub fn keygen(data: &KeyGenData) -> Key {
    let curve = data
        .curve
        .unwrap_or_else(|| curve_for_params(data.ballots, data.options));
    with_curve!(curve, C => keygen_on::<C>())
}

fn keygen_on<C: Curve>() -> Key {
    let mut rng = OsRng;
    let sk = C::sample(&mut rng);
    let pk = C::Point::generator() * sk;
    Key {
        curve: C::ID,
        sk: C::scalar_digits(&sk),
        pk: C::elem_encode(&pk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::digits::Radix;

    #[test]
    fn derives_the_smallest_sufficient_curve() {
        assert_eq!(curve_for_params(1, 2), CurveId::P192);
        assert_eq!(curve_for_params(1023, 20), CurveId::P224);
        assert_eq!(curve_for_params(1023, 25), CurveId::P256);
        assert_eq!(curve_for_params(1023, 38), CurveId::P384);
        assert_eq!(curve_for_params(1023, 60), CurveId::P521);
    }

    #[test]
    fn explicit_curve_wins_over_derivation() {
        let key = keygen(&KeyGenData { ballots: 1, options: 2, curve: Some(CurveId::P384) });
        assert_eq!(key.curve, CurveId::P384);
    }

    fn check_public_key_is_sk_times_generator<C: Curve>(key: &Key) {
        let sk = C::scalar_from_digits(&key.sk, Radix::Base64).unwrap();
        let pk = C::elem_decode(&key.pk).unwrap();
        assert_eq!(pk, C::Point::generator() * sk);
    }

    #[test]
    fn public_key_is_sk_times_generator() {
        let key = keygen(&KeyGenData { ballots: 4, options: 3, curve: Some(CurveId::P256) });
        with_curve!(key.curve, C => check_public_key_is_sk_times_generator::<C>(&key));
    }
}
