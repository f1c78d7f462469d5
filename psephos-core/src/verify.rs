//! Commitment verification.

use group::Group;
use subtle::ConstantTimeEq;

use crate::curve::digits::Radix;
use crate::curve::Curve;
use crate::error::Result;
use crate::model::VerifyComData;
use crate::with_curve;

/// Check that the opening matches the commitment on every slot:
/// a1 = r·G and a2 = m·G + r·H must equal (c1, c2).
///
/// Malformed input — undecodable points or digits, or a com/decom shape
/// mismatch — verifies as `false`: a broken opening does not open the
/// commitment. Point comparison is constant-time over uncompressed
/// encodings.
pub fn verify_com(data: &VerifyComData) -> bool {
    with_curve!(data.key.curve, C => verify_on::<C>(data).unwrap_or(false))
}

fn verify_on<C: Curve>(data: &VerifyComData) -> Result<bool> {
    if data.com.slots.is_empty() || data.com.slots.len() != data.decom.slots.len() {
        return Ok(false);
    }
    let h = C::elem_decode(&data.key.pk)?;
    let g = C::Point::generator();
    let mut ok = true;
    for (cs, ds) in data.com.slots.iter().zip(&data.decom.slots) {
        let rand = C::scalar_from_digits(&ds.randomness, Radix::Base64)?;
        let plain = C::scalar_from_digits(&ds.msg, Radix::Base64)?;
        let c1 = C::elem_decode(&cs.c1)?;
        let c2 = C::elem_decode(&cs.c2)?;
        let a1 = g * rand;
        let a2 = g * plain + h * rand;
        ok &= point_eq::<C>(&a1, &c1) & point_eq::<C>(&a2, &c2);
    }
    Ok(ok)
}

fn point_eq<C: Curve>(a: &C::Point, b: &C::Point) -> bool {
    bool::from(C::point_bytes(a).ct_eq(&C::point_bytes(b)))
}
