//! Wire-shaped data model.
//!
//! These are the structures that cross the wire: numbers are digit strings
//! and points are compressed (x digits + y parity). Primitives convert to
//! typed scalars and points per call; nothing here depends on a concrete
//! curve backend.

use crate::curve::CurveId;

/// A compressed curve point: x coordinate digits plus the parity of y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupElem {
    pub x: String,
    pub y: bool,
}

impl GroupElem {
    /// The point at infinity.
    pub fn infinity() -> Self {
        GroupElem { x: "0".to_string(), y: false }
    }

    pub fn is_infinity(&self) -> bool {
        self.x == "0"
    }
}

/// An ElGamal key pair. The secret key may be empty on requests that only
/// need the public half; the server never retains either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub curve: CurveId,
    pub sk: String,
    pub pk: GroupElem,
}

/// One ciphertext slot: c1 = r·G, c2 = r·H + m·G.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComSlot {
    pub c1: GroupElem,
    pub c2: GroupElem,
}

/// A commitment: one slot per position of the encoded vector. The
/// proof-carrying dialect uses exactly one slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Com {
    pub slots: Vec<ComSlot>,
}

/// The opening of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomSlot {
    pub randomness: String,
    pub msg: String,
}

/// The opening of a commitment, slot by slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decom {
    pub slots: Vec<DecomSlot>,
}

/// Prover's first message: ten points per bit-index
/// (B1 B2 T1 T2 Y1 Y2 W1 W2 D1 D2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Zk1 {
    pub elements: Vec<GroupElem>,
}

/// Prover's private state: nine scalars per bit-index
/// (t z y r b w f a r′), with b ∈ {"0", "1"}.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZkState {
    pub zp: Vec<String>,
}

/// Prover's second message: five scalars per bit-index
/// (t′ z′ y′ w′ f′).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Zk2 {
    pub zp: Vec<String>,
}

/// Proof material attached to one encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncProof {
    pub zk1: Zk1,
    pub state: ZkState,
}

/// One encrypted slot of a ballot vector, with its opening and, in the
/// proof-carrying dialect, the Σ-protocol first message and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enc {
    pub com: Com,
    pub decom: Decom,
    pub proof: Option<EncProof>,
}

/// A voter ballot: one [`Enc`] per option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub encs: Vec<Enc>,
}

/// Generated ballots plus the requested blank (all-zero) ballots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BallotData {
    pub ballots: Vec<Ballot>,
    pub blanks: Vec<Ballot>,
}

/// Which encryption dialect a ballot request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotKind {
    /// Unit-vector encryption, one slot per option, no proof.
    Plain,
    /// Single-slot encryption of N^j with a Σ-protocol proof.
    WithProof,
}

/// Key-generation request: the curve is either named outright or derived
/// from the election size (N ballots, m options).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenData {
    pub ballots: u32,
    pub options: u32,
    pub curve: Option<CurveId>,
}

/// Ballot-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenBallotData {
    pub key: Key,
    /// Number of eligible voters N; the message base is N + 1.
    pub ballots: u32,
    /// Number of options m.
    pub options: u32,
    /// Blank ballots to emit alongside.
    pub blanks: u32,
    /// Ballot copies to generate; this is the fan-out unit.
    pub number: u32,
    pub kind: BallotKind,
}

/// Homomorphic commitment-addition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddComData {
    pub key: Key,
    pub coms: Vec<Com>,
}

/// Homomorphic opening-addition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDecomData {
    pub key: Key,
    pub decoms: Vec<Decom>,
}

/// One proof to complete: the first message is carried for transport
/// symmetry but only the state is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkRecord {
    pub zk1: Zk1,
    pub state: ZkState,
}

/// Proof-completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteZkData {
    pub key: Key,
    pub options: u32,
    /// Hex digits of the verifier's challenge coins.
    pub coins: String,
    pub sets: Vec<ZkRecord>,
}

/// Commitment-verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyComData {
    pub key: Key,
    pub com: Com,
    pub decom: Decom,
}
