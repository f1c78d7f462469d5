//! The request/response schema and its binary codec.
//!
//! One tagged union per direction, six command tags. Numbers travel as
//! digit strings (see `psephos_core::curve::digits`); the codec itself
//! only moves tags, counts and strings. All integers are big-endian,
//! lengths and counts are u32, tags and booleans are single bytes.
//!
//! Field order is fixed and the encoding is symmetric, so the same codec
//! serves the server, clients and the test suite.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use psephos_core::curve::CurveId;
use psephos_core::model::{
    AddComData, AddDecomData, Ballot, BallotData, BallotKind, Com, ComSlot, CompleteZkData,
    Decom, DecomSlot, Enc, EncProof, GenBallotData, GroupElem, Key, KeyGenData, VerifyComData,
    Zk1, Zk2, ZkRecord, ZkState,
};

use crate::error::{Result, WireError};

/// A client request: one of the six commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    KeyGen(KeyGenData),
    GenBallot(GenBallotData),
    AddCom(AddComData),
    AddDecom(AddDecomData),
    CompleteZk(CompleteZkData),
    VerifyCom(VerifyComData),
}

/// A server response, keyed by the same tags as [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Key(Key),
    Ballots(BallotData),
    Combined(Com),
    CombinedDecom(Decom),
    ZkSet(Vec<Zk2>),
    Check(bool),
}

const TAG_KEY_GEN: u8 = 1;
const TAG_GEN_BALLOT: u8 = 2;
const TAG_ADD_COM: u8 = 3;
const TAG_ADD_DECOM: u8 = 4;
const TAG_COMPLETE_ZK: u8 = 5;
const TAG_VERIFY_COM: u8 = 6;

impl Request {
    /// Command tag, shared with the matching response.
    pub fn tag(&self) -> u8 {
        match self {
            Request::KeyGen(_) => TAG_KEY_GEN,
            Request::GenBallot(_) => TAG_GEN_BALLOT,
            Request::AddCom(_) => TAG_ADD_COM,
            Request::AddDecom(_) => TAG_ADD_DECOM,
            Request::CompleteZk(_) => TAG_COMPLETE_ZK,
            Request::VerifyCom(_) => TAG_VERIFY_COM,
        }
    }

    /// Serialize into a frame payload.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(self.tag());
        match self {
            Request::KeyGen(data) => data.encode(&mut buf),
            Request::GenBallot(data) => data.encode(&mut buf),
            Request::AddCom(data) => data.encode(&mut buf),
            Request::AddDecom(data) => data.encode(&mut buf),
            Request::CompleteZk(data) => data.encode(&mut buf),
            Request::VerifyCom(data) => data.encode(&mut buf),
        }
        buf.freeze()
    }

    /// Decode a frame payload; trailing bytes are a schema violation.
    pub fn from_bytes(mut buf: Bytes) -> Result<Self> {
        let tag = get_u8(&mut buf)?;
        let request = match tag {
            TAG_KEY_GEN => Request::KeyGen(KeyGenData::decode(&mut buf)?),
            TAG_GEN_BALLOT => Request::GenBallot(GenBallotData::decode(&mut buf)?),
            TAG_ADD_COM => Request::AddCom(AddComData::decode(&mut buf)?),
            TAG_ADD_DECOM => Request::AddDecom(AddDecomData::decode(&mut buf)?),
            TAG_COMPLETE_ZK => Request::CompleteZk(CompleteZkData::decode(&mut buf)?),
            TAG_VERIFY_COM => Request::VerifyCom(VerifyComData::decode(&mut buf)?),
            other => return Err(WireError::UnknownCommand(other)),
        };
        ensure_drained(&buf)?;
        Ok(request)
    }
}

impl Response {
    /// Command tag, shared with the originating request.
    pub fn tag(&self) -> u8 {
        match self {
            Response::Key(_) => TAG_KEY_GEN,
            Response::Ballots(_) => TAG_GEN_BALLOT,
            Response::Combined(_) => TAG_ADD_COM,
            Response::CombinedDecom(_) => TAG_ADD_DECOM,
            Response::ZkSet(_) => TAG_COMPLETE_ZK,
            Response::Check(_) => TAG_VERIFY_COM,
        }
    }

    /// Serialize into a frame payload.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(self.tag());
        match self {
            Response::Key(key) => key.encode(&mut buf),
            Response::Ballots(data) => data.encode(&mut buf),
            Response::Combined(com) => com.encode(&mut buf),
            Response::CombinedDecom(decom) => decom.encode(&mut buf),
            Response::ZkSet(set) => put_seq(&mut buf, set),
            Response::Check(check) => buf.put_u8(u8::from(*check)),
        }
        buf.freeze()
    }

    /// Decode a frame payload; trailing bytes are a schema violation.
    pub fn from_bytes(mut buf: Bytes) -> Result<Self> {
        let tag = get_u8(&mut buf)?;
        let response = match tag {
            TAG_KEY_GEN => Response::Key(Key::decode(&mut buf)?),
            TAG_GEN_BALLOT => Response::Ballots(BallotData::decode(&mut buf)?),
            TAG_ADD_COM => Response::Combined(Com::decode(&mut buf)?),
            TAG_ADD_DECOM => Response::CombinedDecom(Decom::decode(&mut buf)?),
            TAG_COMPLETE_ZK => Response::ZkSet(get_seq(&mut buf)?),
            TAG_VERIFY_COM => Response::Check(get_bool(&mut buf)?),
            other => return Err(WireError::UnknownCommand(other)),
        };
        ensure_drained(&buf)?;
        Ok(response)
    }
}

// Buffer primitives ----------------------------------------------------------

fn need(buf: &Bytes, n: usize) -> Result<()> {
    if buf.remaining() < n {
        Err(WireError::decode("truncated payload"))
    } else {
        Ok(())
    }
}

fn ensure_drained(buf: &Bytes) -> Result<()> {
    if buf.has_remaining() {
        Err(WireError::decode("trailing bytes after payload"))
    } else {
        Ok(())
    }
}

fn get_u8(buf: &mut Bytes) -> Result<u8> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut Bytes) -> Result<u32> {
    need(buf, 4)?;
    Ok(buf.get_u32())
}

fn get_bool(buf: &mut Bytes) -> Result<bool> {
    match get_u8(buf)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(WireError::Decode(format!("invalid boolean {other}"))),
    }
}

fn put_str(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn get_str(buf: &mut Bytes) -> Result<String> {
    let len = get_u32(buf)? as usize;
    need(buf, len)?;
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|_| WireError::decode("non-utf8 string"))
}

/// Read a count that is plausible for the bytes that remain.
fn get_count(buf: &mut Bytes) -> Result<usize> {
    let count = get_u32(buf)? as usize;
    if count > buf.remaining() {
        return Err(WireError::decode("count exceeds payload"));
    }
    Ok(count)
}

fn put_seq<T: Wire>(buf: &mut BytesMut, items: &[T]) {
    buf.put_u32(items.len() as u32);
    for item in items {
        item.encode(buf);
    }
}

fn get_seq<T: Wire>(buf: &mut Bytes) -> Result<Vec<T>> {
    let count = get_count(buf)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::decode(buf)?);
    }
    Ok(items)
}

// Model codecs ---------------------------------------------------------------

trait Wire: Sized {
    fn encode(&self, buf: &mut BytesMut);
    fn decode(buf: &mut Bytes) -> Result<Self>;
}

impl Wire for GroupElem {
    fn encode(&self, buf: &mut BytesMut) {
        put_str(buf, &self.x);
        buf.put_u8(u8::from(self.y));
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(GroupElem { x: get_str(buf)?, y: get_bool(buf)? })
    }
}

impl Wire for Key {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.curve.wire());
        put_str(buf, &self.sk);
        self.pk.encode(buf);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Key {
            curve: CurveId::from_wire(get_u8(buf)?)?,
            sk: get_str(buf)?,
            pk: GroupElem::decode(buf)?,
        })
    }
}

impl Wire for ComSlot {
    fn encode(&self, buf: &mut BytesMut) {
        self.c1.encode(buf);
        self.c2.encode(buf);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(ComSlot { c1: GroupElem::decode(buf)?, c2: GroupElem::decode(buf)? })
    }
}

impl Wire for Com {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.slots);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Com { slots: get_seq(buf)? })
    }
}

impl Wire for DecomSlot {
    fn encode(&self, buf: &mut BytesMut) {
        put_str(buf, &self.randomness);
        put_str(buf, &self.msg);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(DecomSlot { randomness: get_str(buf)?, msg: get_str(buf)? })
    }
}

impl Wire for Decom {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.slots);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Decom { slots: get_seq(buf)? })
    }
}

impl Wire for String {
    fn encode(&self, buf: &mut BytesMut) {
        put_str(buf, self);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        get_str(buf)
    }
}

impl Wire for Zk1 {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.elements);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Zk1 { elements: get_seq(buf)? })
    }
}

impl Wire for ZkState {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.zp);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(ZkState { zp: get_seq(buf)? })
    }
}

impl Wire for Zk2 {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.zp);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Zk2 { zp: get_seq(buf)? })
    }
}

impl Wire for Enc {
    fn encode(&self, buf: &mut BytesMut) {
        self.com.encode(buf);
        self.decom.encode(buf);
        match &self.proof {
            Some(proof) => {
                buf.put_u8(1);
                proof.zk1.encode(buf);
                proof.state.encode(buf);
            }
            None => buf.put_u8(0),
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let com = Com::decode(buf)?;
        let decom = Decom::decode(buf)?;
        let proof = if get_bool(buf)? {
            Some(EncProof { zk1: Zk1::decode(buf)?, state: ZkState::decode(buf)? })
        } else {
            None
        };
        Ok(Enc { com, decom, proof })
    }
}

impl Wire for Ballot {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.encs);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Ballot { encs: get_seq(buf)? })
    }
}

impl Wire for BallotData {
    fn encode(&self, buf: &mut BytesMut) {
        put_seq(buf, &self.ballots);
        put_seq(buf, &self.blanks);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(BallotData { ballots: get_seq(buf)?, blanks: get_seq(buf)? })
    }
}

impl Wire for KeyGenData {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.ballots);
        buf.put_u32(self.options);
        match self.curve {
            Some(curve) => {
                buf.put_u8(1);
                buf.put_u8(curve.wire());
            }
            None => buf.put_u8(0),
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        let ballots = get_u32(buf)?;
        let options = get_u32(buf)?;
        let curve = if get_bool(buf)? {
            Some(CurveId::from_wire(get_u8(buf)?)?)
        } else {
            None
        };
        Ok(KeyGenData { ballots, options, curve })
    }
}

impl Wire for GenBallotData {
    fn encode(&self, buf: &mut BytesMut) {
        self.key.encode(buf);
        buf.put_u32(self.ballots);
        buf.put_u32(self.options);
        buf.put_u32(self.blanks);
        buf.put_u32(self.number);
        buf.put_u8(match self.kind {
            BallotKind::Plain => 0,
            BallotKind::WithProof => 1,
        });
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(GenBallotData {
            key: Key::decode(buf)?,
            ballots: get_u32(buf)?,
            options: get_u32(buf)?,
            blanks: get_u32(buf)?,
            number: get_u32(buf)?,
            kind: match get_u8(buf)? {
                0 => BallotKind::Plain,
                1 => BallotKind::WithProof,
                other => {
                    return Err(WireError::Decode(format!("invalid ballot kind {other}")))
                }
            },
        })
    }
}

impl Wire for AddComData {
    fn encode(&self, buf: &mut BytesMut) {
        self.key.encode(buf);
        put_seq(buf, &self.coms);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(AddComData { key: Key::decode(buf)?, coms: get_seq(buf)? })
    }
}

impl Wire for AddDecomData {
    fn encode(&self, buf: &mut BytesMut) {
        self.key.encode(buf);
        put_seq(buf, &self.decoms);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(AddDecomData { key: Key::decode(buf)?, decoms: get_seq(buf)? })
    }
}

impl Wire for ZkRecord {
    fn encode(&self, buf: &mut BytesMut) {
        self.zk1.encode(buf);
        self.state.encode(buf);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(ZkRecord { zk1: Zk1::decode(buf)?, state: ZkState::decode(buf)? })
    }
}

impl Wire for CompleteZkData {
    fn encode(&self, buf: &mut BytesMut) {
        self.key.encode(buf);
        buf.put_u32(self.options);
        put_str(buf, &self.coins);
        put_seq(buf, &self.sets);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(CompleteZkData {
            key: Key::decode(buf)?,
            options: get_u32(buf)?,
            coins: get_str(buf)?,
            sets: get_seq(buf)?,
        })
    }
}

impl Wire for VerifyComData {
    fn encode(&self, buf: &mut BytesMut) {
        self.key.encode(buf);
        self.com.encode(buf);
        self.decom.encode(buf);
    }

    fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(VerifyComData {
            key: Key::decode(buf)?,
            com: Com::decode(buf)?,
            decom: Decom::decode(buf)?,
        })
    }
}
