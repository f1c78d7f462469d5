//! Homomorphic addition of commitments and openings.

use group::ff::Field;
use group::Group;

use crate::curve::digits::Radix;
use crate::curve::Curve;
use crate::error::{CryptoError, Result};
use crate::model::{AddComData, AddDecomData, Com, ComSlot, Decom, DecomSlot};
use crate::with_curve;

/// Slot-wise point addition across all input commitments. Both c1 and c2
/// are summed; every input must share the first input's slot count.
pub fn add_coms(data: &AddComData) -> Result<Com> {
    with_curve!(data.key.curve, C => add_coms_on::<C>(&data.coms))
}

fn add_coms_on<C: Curve>(coms: &[Com]) -> Result<Com> {
    let width = match coms.first() {
        Some(com) => com.slots.len(),
        None => return Err(CryptoError::ShapeMismatch),
    };
    if width == 0 || coms.iter().any(|com| com.slots.len() != width) {
        return Err(CryptoError::ShapeMismatch);
    }
    let identity = <C::Point as Group>::identity();
    let mut acc = vec![(identity, identity); width];
    for com in coms {
        for (slot, sum) in com.slots.iter().zip(acc.iter_mut()) {
            sum.0 += C::elem_decode(&slot.c1)?;
            sum.1 += C::elem_decode(&slot.c2)?;
        }
    }
    Ok(Com {
        slots: acc
            .iter()
            .map(|(c1, c2)| ComSlot {
                c1: C::elem_encode(c1),
                c2: C::elem_encode(c2),
            })
            .collect(),
    })
}

/// Slot-wise addition mod q of randomness and message across all input
/// openings. Same shape rules as [`add_coms`].
pub fn add_decoms(data: &AddDecomData) -> Result<Decom> {
    with_curve!(data.key.curve, C => add_decoms_on::<C>(&data.decoms))
}

fn add_decoms_on<C: Curve>(decoms: &[Decom]) -> Result<Decom> {
    let width = match decoms.first() {
        Some(decom) => decom.slots.len(),
        None => return Err(CryptoError::ShapeMismatch),
    };
    if width == 0 || decoms.iter().any(|decom| decom.slots.len() != width) {
        return Err(CryptoError::ShapeMismatch);
    }
    let mut acc = vec![(C::Scalar::ZERO, C::Scalar::ZERO); width];
    for decom in decoms {
        for (slot, sum) in decom.slots.iter().zip(acc.iter_mut()) {
            sum.0 += C::scalar_from_digits(&slot.randomness, Radix::Base64)?;
            sum.1 += C::scalar_from_digits(&slot.msg, Radix::Base64)?;
        }
    }
    Ok(Decom {
        slots: acc
            .iter()
            .map(|(randomness, msg)| DecomSlot {
                randomness: C::scalar_digits(randomness),
                msg: C::scalar_digits(msg),
            })
            .collect(),
    })
}
