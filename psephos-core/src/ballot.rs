//! Ballot generation.
//!
//! A ballot carries one encryption per option. Two dialects exist:
//!
//! - **plain**: each encryption is the unit vector e_j over m slots,
//!   (c1, c2) = (r·G, r·H + bit·G) per slot, opened by (r, bit);
//! - **with proof**: each encryption is a single slot carrying N^j with
//!   blinding ∏ r′, plus the Σ-protocol first message and prover state.
//!
//! Blank ballots are all-zero vectors in the plain shape; "one of m
//! messages" is not provable for the zero vector, so blanks never carry a
//! proof.

use group::ff::Field;
use group::Group;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};

use crate::curve::Curve;
use crate::error::{CryptoError, Result};
use crate::model::{
    Ballot, BallotKind, Com, ComSlot, Decom, DecomSlot, Enc, EncProof, GenBallotData,
};
use crate::sigma::{self, Witness};
use crate::with_curve;

/// Generate `copies` ballots for this worker's slice of the request.
pub fn gen_ballots(data: &GenBallotData, copies: u32) -> Result<Vec<Ballot>> {
    if data.options == 0 {
        return Err(CryptoError::Parameter("options must be at least 1"));
    }
    with_curve!(data.key.curve, C => gen_on::<C>(data, copies, false))
}

/// Generate `count` blank (all-zero) ballots.
pub fn gen_blanks(data: &GenBallotData, count: u32) -> Result<Vec<Ballot>> {
    if data.options == 0 {
        return Err(CryptoError::Parameter("options must be at least 1"));
    }
    with_curve!(data.key.curve, C => gen_on::<C>(data, count, true))
}

fn gen_on<C: Curve>(data: &GenBallotData, copies: u32, blank: bool) -> Result<Vec<Ballot>> {
    let mut rng = OsRng;
    let h = C::elem_decode(&data.key.pk)?;
    let base = C::Scalar::from(u64::from(data.ballots) + 1);
    let ballots = (0..copies)
        .map(|_| {
            let encs = (0..data.options)
                .map(|j| {
                    if blank {
                        plain_enc::<C, _>(&mut rng, &h, None, data.options)
                    } else {
                        match data.kind {
                            BallotKind::Plain => {
                                plain_enc::<C, _>(&mut rng, &h, Some(j), data.options)
                            }
                            BallotKind::WithProof => {
                                proof_enc::<C, _>(&mut rng, &h, base, j, data.options)
                            }
                        }
                    }
                })
                .collect();
            Ballot { encs }
        })
        .collect();
    Ok(ballots)
}

/// Encrypt the unit vector e_choice (or the zero vector) over m slots.
fn plain_enc<C: Curve, R: RngCore + CryptoRng>(
    rng: &mut R,
    h: &C::Point,
    choice: Option<u32>,
    options: u32,
) -> Enc {
    let g = C::Point::generator();
    let mut com = Vec::with_capacity(options as usize);
    let mut decom = Vec::with_capacity(options as usize);
    for ctr in 0..options {
        let r = C::sample(rng);
        let one = choice == Some(ctr);
        let c1 = g * r;
        let mut c2 = *h * r;
        if one {
            c2 += g;
        }
        com.push(ComSlot {
            c1: C::elem_encode(&c1),
            c2: C::elem_encode(&c2),
        });
        decom.push(DecomSlot {
            randomness: C::scalar_digits(&r),
            msg: C::scalar_digits(&C::Scalar::from(u64::from(one))),
        });
    }
    Enc {
        com: Com { slots: com },
        decom: Decom { slots: decom },
        proof: None,
    }
}

/// Encrypt N^choice in a single slot with its Σ-protocol commitment.
fn proof_enc<C: Curve, R: RngCore + CryptoRng>(
    rng: &mut R,
    h: &C::Point,
    base: C::Scalar,
    choice: u32,
    options: u32,
) -> Enc {
    let g = C::Point::generator();
    let nbits = sigma::proof_bits(options);
    let witness = Witness::<C>::sample(rng, base, choice, nbits);
    let msg = base.pow_vartime([u64::from(choice)]);
    let r = witness.blinding;
    let c1 = g * r;
    let c2 = g * msg + *h * r;
    let (zk1, state) = witness.commit(h);
    Enc {
        com: Com {
            slots: vec![ComSlot {
                c1: C::elem_encode(&c1),
                c2: C::elem_encode(&c2),
            }],
        },
        decom: Decom {
            slots: vec![DecomSlot {
                randomness: C::scalar_digits(&r),
                msg: C::scalar_digits(&msg),
            }],
        },
        proof: Some(EncProof { zk1, state }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::digits::Radix;
    use crate::curve::CurveId;
    use crate::keygen::keygen;
    use crate::model::KeyGenData;
    use crate::sigma::{STATE_PER_BIT, ZK1_PER_BIT};

    fn test_key(curve: CurveId) -> crate::model::Key {
        keygen(&KeyGenData { ballots: 1, options: 2, curve: Some(curve) })
    }

    fn request(key: crate::model::Key, kind: BallotKind) -> GenBallotData {
        GenBallotData { key, ballots: 1, options: 2, blanks: 0, number: 1, kind }
    }

    #[test]
    fn plain_ballot_is_a_unit_vector_per_option() {
        let data = request(test_key(CurveId::P192), BallotKind::Plain);
        let ballots = gen_ballots(&data, 1).unwrap();
        assert_eq!(ballots.len(), 1);
        let encs = &ballots[0].encs;
        assert_eq!(encs.len(), 2);
        for (j, enc) in encs.iter().enumerate() {
            assert_eq!(enc.com.slots.len(), 2);
            let ones: Vec<usize> = enc
                .decom
                .slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.msg == "1")
                .map(|(i, _)| i)
                .collect();
            assert_eq!(ones, vec![j]);
        }
    }

    fn check_plain_slots_decrypt_to_their_bits<C: Curve>(key: &crate::model::Key, ballots: &[Ballot]) {
        let sk = C::scalar_from_digits(&key.sk, Radix::Base64).unwrap();
        let g = C::Point::generator();
        for enc in &ballots[0].encs {
            for (cs, ds) in enc.com.slots.iter().zip(&enc.decom.slots) {
                let c1 = C::elem_decode(&cs.c1).unwrap();
                let c2 = C::elem_decode(&cs.c2).unwrap();
                let msg = C::scalar_from_digits(&ds.msg, Radix::Base64).unwrap();
                assert_eq!(c2 - c1 * sk, g * msg);
            }
        }
    }

    #[test]
    fn plain_slots_decrypt_to_their_bits() {
        let key = test_key(CurveId::P192);
        let data = request(key.clone(), BallotKind::Plain);
        let ballots = gen_ballots(&data, 1).unwrap();
        with_curve!(key.curve, C => check_plain_slots_decrypt_to_their_bits::<C>(&key, &ballots));
    }

    fn check_proof_ballot_carries_full_proof_material<C: Curve>(
        key: &crate::model::Key,
        encs: &[Enc],
    ) {
        let sk = C::scalar_from_digits(&key.sk, Radix::Base64).unwrap();
        let g = C::Point::generator();
        let base = C::Scalar::from(2);
        for (j, enc) in encs.iter().enumerate() {
            let proof = enc.proof.as_ref().unwrap();
            assert_eq!(proof.zk1.elements.len(), ZK1_PER_BIT * 2);
            assert_eq!(proof.state.zp.len(), STATE_PER_BIT * 2);
            assert_eq!(enc.com.slots.len(), 1);
            // decrypts to N^j
            let c1 = C::elem_decode(&enc.com.slots[0].c1).unwrap();
            let c2 = C::elem_decode(&enc.com.slots[0].c2).unwrap();
            let msg = base.pow_vartime([j as u64]);
            assert_eq!(c2 - c1 * sk, g * msg);
            let recorded = C::scalar_from_digits(&enc.decom.slots[0].msg, Radix::Base64).unwrap();
            assert_eq!(recorded, msg);
        }
    }

    #[test]
    fn proof_ballot_carries_full_proof_material() {
        let key = test_key(CurveId::P192);
        let data = GenBallotData { options: 4, ..request(key.clone(), BallotKind::WithProof) };
        let ballots = gen_ballots(&data, 1).unwrap();
        let encs = &ballots[0].encs;
        assert_eq!(encs.len(), 4);
        with_curve!(key.curve, C => check_proof_ballot_carries_full_proof_material::<C>(&key, encs));
    }

    #[test]
    fn blanks_encrypt_the_zero_vector() {
        let key = test_key(CurveId::P192);
        let data = request(key.clone(), BallotKind::Plain);
        let blanks = gen_blanks(&data, 2).unwrap();
        assert_eq!(blanks.len(), 2);
        for ballot in &blanks {
            for enc in &ballot.encs {
                assert!(enc.proof.is_none());
                assert!(enc.decom.slots.iter().all(|slot| slot.msg == "0"));
            }
        }
    }

    #[test]
    fn zero_options_is_rejected() {
        let mut data = request(test_key(CurveId::P192), BallotKind::Plain);
        data.options = 0;
        assert!(matches!(gen_ballots(&data, 1), Err(CryptoError::Parameter(_))));
    }
}
