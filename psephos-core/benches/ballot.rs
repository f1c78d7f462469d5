//! Ballot generation throughput — the dominant cost of the server.

use criterion::{criterion_group, criterion_main, Criterion};

use psephos_core::ballot::gen_ballots;
use psephos_core::curve::CurveId;
use psephos_core::keygen::keygen;
use psephos_core::model::{BallotKind, GenBallotData, KeyGenData};

fn bench_gen_ballot(c: &mut Criterion) {
    let key = keygen(&KeyGenData { ballots: 100, options: 8, curve: Some(CurveId::P256) });
    let plain = GenBallotData {
        key,
        ballots: 100,
        options: 8,
        blanks: 0,
        number: 1,
        kind: BallotKind::Plain,
    };
    let proved = GenBallotData { kind: BallotKind::WithProof, ..plain.clone() };

    c.bench_function("gen_ballot_plain_p256_m8", |b| {
        b.iter(|| gen_ballots(&plain, 1).unwrap());
    });
    c.bench_function("gen_ballot_proof_p256_m8", |b| {
        b.iter(|| gen_ballots(&proved, 1).unwrap());
    });
}

criterion_group!(benches, bench_gen_ballot);
criterion_main!(benches);
