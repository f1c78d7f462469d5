//! Length-prefixed framing.
//!
//! Each direction carries a 4-byte big-endian unsigned length followed by
//! that many payload bytes. Lengths outside [1, 2^24] are rejected before
//! any payload is read.

use std::io::{Read, Write};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, WireError};
use crate::io::{recv_exact, send_exact};

/// Largest payload either direction will carry.
pub const MAX_FRAME_LEN: usize = 16_777_216;

/// Read one frame; each of the two transfers gets the full `budget`.
pub fn read_frame<S: Read>(stream: &mut S, budget: Duration) -> Result<Bytes> {
    let mut prefix = [0u8; 4];
    recv_exact(stream, &mut prefix, budget)?;
    let len = u32::from_be_bytes(prefix) as usize;
    if len < 1 || len > MAX_FRAME_LEN {
        return Err(WireError::FrameLength(len as u64));
    }
    let mut payload = vec![0u8; len];
    recv_exact(stream, &mut payload, budget)?;
    Ok(Bytes::from(payload))
}

/// Write one frame; each of the two transfers gets the full `budget`.
pub fn write_frame<S: Write>(stream: &mut S, payload: &[u8], budget: Duration) -> Result<()> {
    if payload.is_empty() || payload.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameLength(payload.len() as u64));
    }
    send_exact(stream, &(payload.len() as u32).to_be_bytes(), budget)?;
    send_exact(stream, payload, budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BUDGET: Duration = Duration::from_secs(5);

    #[test]
    fn frames_round_trip() {
        for payload in [vec![0x42], vec![0; 1024], (0..=255).cycle().take(70_000).collect()] {
            let mut wire = Vec::new();
            write_frame(&mut wire, &payload, BUDGET).unwrap();
            assert_eq!(wire.len(), 4 + payload.len());
            let mut reader = Cursor::new(wire);
            assert_eq!(read_frame(&mut reader, BUDGET).unwrap(), payload);
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        let mut reader = Cursor::new(vec![0, 0, 0, 0]);
        assert!(matches!(
            read_frame(&mut reader, BUDGET),
            Err(WireError::FrameLength(0))
        ));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut wire = ((MAX_FRAME_LEN + 1) as u32).to_be_bytes().to_vec();
        wire.push(0);
        let mut reader = Cursor::new(wire);
        assert!(matches!(
            read_frame(&mut reader, BUDGET),
            Err(WireError::FrameLength(_))
        ));
        assert!(matches!(
            write_frame(&mut Vec::new(), &[], BUDGET),
            Err(WireError::FrameLength(0))
        ));
    }

    #[test]
    fn truncated_payload_is_connection_closed() {
        let mut wire = 10u32.to_be_bytes().to_vec();
        wire.extend_from_slice(&[1, 2, 3]);
        let mut reader = Cursor::new(wire);
        assert!(matches!(
            read_frame(&mut reader, BUDGET),
            Err(WireError::ConnectionClosed)
        ));
    }
}
