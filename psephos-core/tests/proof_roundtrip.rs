//! End-to-end Σ-protocol check: commitments from ballot generation plus
//! responses from proof completion must satisfy all verifier equations.

use group::ff::Field;
use group::Group;

use psephos_core::ballot::gen_ballots;
use psephos_core::curve::digits::Radix;
use psephos_core::curve::{Curve, CurveId};
use psephos_core::keygen::keygen;
use psephos_core::model::{
    BallotKind, CompleteZkData, Enc, GenBallotData, Key, KeyGenData, Zk2, ZkRecord,
};
use psephos_core::sigma::{complete, proof_bits, RESP_PER_BIT, ZK1_PER_BIT};
use psephos_core::with_curve;

const COINS: &str = "3f9a00c1d2e4b5a6978812aa34cc56ee78ff9a0b1c2d3e4f55667788";

#[test]
fn completed_proofs_satisfy_every_verifier_equation() {
    let curve = CurveId::P192;
    let key = keygen(&KeyGenData { ballots: 600, options: 4, curve: Some(curve) });
    let data = GenBallotData {
        key: key.clone(),
        ballots: 600,
        options: 4,
        blanks: 0,
        number: 1,
        kind: BallotKind::WithProof,
    };
    let ballots = gen_ballots(&data, 1).unwrap();
    let encs = &ballots[0].encs;

    let sets: Vec<ZkRecord> = encs
        .iter()
        .map(|enc| {
            let proof = enc.proof.as_ref().unwrap();
            ZkRecord { zk1: proof.zk1.clone(), state: proof.state.clone() }
        })
        .collect();
    let responses = complete(&CompleteZkData {
        key: key.clone(),
        options: 4,
        coins: COINS.to_string(),
        sets,
    })
    .unwrap();
    assert_eq!(responses.len(), encs.len());

    let nbits = proof_bits(4);
    with_curve!(curve, C => check_verifier_equations::<C>(&key, encs, &responses, nbits));
}

fn check_verifier_equations<C: Curve>(key: &Key, encs: &[Enc], responses: &[Zk2], nbits: usize) {
    {
        let g = C::Point::generator();
        let h = C::elem_decode(&key.pk).unwrap();
        let ch = C::scalar_from_digits(COINS, Radix::Hex).unwrap();
        let n = C::Scalar::from(601u64);

        for (enc, zk2) in encs.iter().zip(responses) {
            let proof = enc.proof.as_ref().unwrap();
            let points: Vec<_> = proof
                .zk1
                .elements
                .iter()
                .map(|elem| C::elem_decode(elem).unwrap())
                .collect();
            let resp: Vec<_> = zk2
                .zp
                .iter()
                .map(|s| C::scalar_from_digits(s, Radix::Base64).unwrap())
                .collect();
            let e1 = C::elem_decode(&enc.com.slots[0].c1).unwrap();
            let e2 = C::elem_decode(&enc.com.slots[0].c2).unwrap();

            let mut prod_w = C::Scalar::ONE;
            let mut prod_f = C::Scalar::ONE;
            let mut d1_sum = <C::Point as Group>::identity();
            let mut d2_sum = <C::Point as Group>::identity();
            let mut ch_pow = C::Scalar::ONE;
            let mut n_pow = n;

            for ctr in 0..nbits {
                let [b1, b2, t1, t2, y1, y2, w1, w2, d1, d2]: [_; ZK1_PER_BIT] =
                    points[ZK1_PER_BIT * ctr..ZK1_PER_BIT * (ctr + 1)]
                        .try_into()
                        .unwrap();
                let [tp, zp, yp, wp, fp]: [_; RESP_PER_BIT] =
                    resp[RESP_PER_BIT * ctr..RESP_PER_BIT * (ctr + 1)]
                        .try_into()
                        .unwrap();

                // ch·B + T = com(t′; z′)
                assert_eq!(b1 * ch + t1, g * zp);
                assert_eq!(b2 * ch + t2, g * tp + h * zp);
                // (com(1;0)/B)^t′ / Y = com(0; y′)
                assert_eq!((-b1) * tp - y1, g * yp);
                assert_eq!((g - b2) * tp - y2, h * yp);
                // A^ch · W = com(w′; f′), with A = (N^(2^ctr) − 1)·B [+ G]
                let stretch = n_pow - C::Scalar::ONE;
                assert_eq!(b1 * stretch * ch + w1, g * fp);
                assert_eq!((b2 * stretch + g) * ch + w2, g * wp + h * fp);

                prod_w *= wp;
                prod_f *= fp;
                d1_sum += d1 * ch_pow;
                d2_sum += d2 * ch_pow;
                ch_pow *= ch;
                n_pow = n_pow.square();
            }

            // product equation across bit-indices; ch_pow is now ch^L
            assert_eq!(e1 * ch_pow + d1_sum, g * prod_f);
            assert_eq!(e2 * ch_pow + d2_sum, h * prod_f + g * prod_w);
        }
    }
}
