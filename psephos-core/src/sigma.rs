//! Σ-protocol for "encryption of one of m messages".
//!
//! For an encryption of N^j under an m-option election, the prover commits
//! to ⌈log2 m⌉ bit-indices. Per bit-index the first message carries ten
//! points (B1 B2 T1 T2 Y1 Y2 W1 W2 D1 D2) and the private state nine
//! scalars (t z y r b w f a r′); the response to a challenge ch is five
//! scalars (t′ z′ y′ w′ f′). The D points commit to the coefficient
//! vectors β, γ of the products ∏(w + a·X) and ∏(f + r′·X), whose top
//! coefficients are the encrypted message power and the blinding.

use group::ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use smallvec::SmallVec;

use crate::curve::digits::Radix;
use crate::curve::Curve;
use crate::error::{CryptoError, Result};
use crate::model::{CompleteZkData, Zk1, Zk2, ZkState};
use crate::with_curve;

/// Points in the first message, per bit-index.
pub const ZK1_PER_BIT: usize = 10;
/// Scalars in the prover state, per bit-index.
pub const STATE_PER_BIT: usize = 9;
/// Scalars in the response, per bit-index.
pub const RESP_PER_BIT: usize = 5;

/// ⌈log2(options)⌉ — the number of bit-indices in one proof.
pub fn proof_bits(options: u32) -> usize {
    if options <= 1 {
        0
    } else {
        (32 - (options - 1).leading_zeros()) as usize
    }
}

struct BitWitness<C: Curve> {
    t: C::Scalar,
    z: C::Scalar,
    y: C::Scalar,
    r: C::Scalar,
    w: C::Scalar,
    f: C::Scalar,
    a: C::Scalar,
    rp: C::Scalar,
    bit: bool,
}

/// Auxiliary randomness for one encryption's proof.
pub(crate) struct Witness<C: Curve> {
    bits: SmallVec<[BitWitness<C>; 8]>,
    /// ∏ r′ — the blinding of the encryption itself.
    pub blinding: C::Scalar,
}

impl<C: Curve> Witness<C> {
    /// Sample the per-bit scalars for an encryption of `base`^`choice`.
    ///
    /// Per bit-index j: a = base^(2^j) when the bit of `choice` is set,
    /// else 1; r′ = r·(base^(2^j) − 1).
    pub fn sample<R: RngCore + CryptoRng>(
        rng: &mut R,
        base: C::Scalar,
        choice: u32,
        nbits: usize,
    ) -> Self {
        let mut bits = SmallVec::new();
        let mut blinding = C::Scalar::ONE;
        let mut base_pow = base;
        let mut index = choice;
        for _ in 0..nbits {
            let bit = index & 1 == 1;
            index >>= 1;
            let r = C::sample(rng);
            let rp = r * (base_pow - C::Scalar::ONE);
            blinding *= rp;
            bits.push(BitWitness {
                t: C::sample(rng),
                z: C::sample(rng),
                y: C::sample(rng),
                r,
                w: C::sample(rng),
                f: C::sample(rng),
                a: if bit { base_pow } else { C::Scalar::ONE },
                rp,
                bit,
            });
            base_pow = base_pow.square();
        }
        Witness { bits, blinding }
    }

    /// Build the first message and the prover state.
    pub fn commit(&self, h: &C::Point) -> (Zk1, ZkState) {
        let g = C::Point::generator();
        let nbits = self.bits.len();

        let mut beta: Vec<C::Scalar> = vec![C::Scalar::ONE];
        let mut gamma: Vec<C::Scalar> = vec![C::Scalar::ONE];
        for bw in &self.bits {
            beta = mul_linear::<C>(&beta, bw.w, bw.a);
            gamma = mul_linear::<C>(&gamma, bw.f, bw.rp);
        }

        let mut elements = Vec::with_capacity(ZK1_PER_BIT * nbits);
        for (ctr, bw) in self.bits.iter().enumerate() {
            let b1 = g * bw.r;
            let b2 = if bw.bit { g + *h * bw.r } else { *h * bw.r };
            let t1 = g * bw.z;
            let t2 = g * bw.t + *h * bw.z;
            let y1 = g * bw.y;
            let y2 = if bw.bit { *h * bw.y } else { g * bw.t + *h * bw.y };
            let w1 = g * bw.f;
            let w2 = g * bw.w + *h * bw.f;
            let d1 = g * gamma[ctr];
            let d2 = g * beta[ctr] + *h * gamma[ctr];
            for point in [b1, b2, t1, t2, y1, y2, w1, w2, d1, d2] {
                elements.push(C::elem_encode(&point));
            }
        }

        let mut zp = Vec::with_capacity(STATE_PER_BIT * nbits);
        for bw in &self.bits {
            zp.push(C::scalar_digits(&bw.t));
            zp.push(C::scalar_digits(&bw.z));
            zp.push(C::scalar_digits(&bw.y));
            zp.push(C::scalar_digits(&bw.r));
            zp.push(if bw.bit { "1" } else { "0" }.to_string());
            zp.push(C::scalar_digits(&bw.w));
            zp.push(C::scalar_digits(&bw.f));
            zp.push(C::scalar_digits(&bw.a));
            zp.push(C::scalar_digits(&bw.rp));
        }

        (Zk1 { elements }, ZkState { zp })
    }
}

/// Multiply a coefficient vector by the linear factor (c0 + c1·X).
fn mul_linear<C: Curve>(poly: &[C::Scalar], c0: C::Scalar, c1: C::Scalar) -> Vec<C::Scalar> {
    let mut out = vec![C::Scalar::ZERO; poly.len() + 1];
    for (i, &coeff) in poly.iter().enumerate() {
        out[i] += coeff * c0;
        out[i + 1] += coeff * c1;
    }
    out
}

/// Complete every proof in the request against the verifier's challenge.
///
/// The challenge is the full hex `coins` string folded mod the curve
/// order; the first message is never reopened, only the stored state.
pub fn complete(data: &CompleteZkData) -> Result<Vec<Zk2>> {
    with_curve!(data.key.curve, C => complete_on::<C>(data))
}

fn complete_on<C: Curve>(data: &CompleteZkData) -> Result<Vec<Zk2>> {
    let ch = C::scalar_from_digits(&data.coins, Radix::Hex)?;
    let nbits = proof_bits(data.options);
    data.sets
        .iter()
        .map(|record| respond_on::<C>(&record.state, nbits, ch))
        .collect()
}

fn respond_on<C: Curve>(state: &ZkState, nbits: usize, ch: C::Scalar) -> Result<Zk2> {
    if state.zp.len() < STATE_PER_BIT * nbits {
        return Err(CryptoError::ShapeMismatch);
    }
    let mut resp = Vec::with_capacity(RESP_PER_BIT * nbits);
    for ctr in 0..nbits {
        let at = STATE_PER_BIT * ctr;
        let scalar =
            |i: usize| C::scalar_from_digits(&state.zp[at + i], Radix::Base64);
        let t = scalar(0)?;
        let z = scalar(1)?;
        let y = scalar(2)?;
        let r = scalar(3)?;
        let bit = state.zp[at + 4] == "1";
        let w = scalar(5)?;
        let f = scalar(6)?;
        let a = scalar(7)?;
        let rp = scalar(8)?;

        let tp = if bit { ch + t } else { t };
        let zp = r * ch + z;
        let yp = -(y + r * tp);
        let wp = a * ch + w;
        let fp = rp * ch + f;
        for s in [tp, zp, yp, wp, fp] {
            resp.push(C::scalar_digits(&s));
        }
    }
    Ok(Zk2 { zp: resp })
}
