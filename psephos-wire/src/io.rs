//! Exact-transfer socket I/O.
//!
//! Both directions move exactly `buf.len()` bytes or fail. Transient
//! signal interruptions are retried transparently. The timeout budget
//! applies to the *aggregate* transfer, measured on the monotonic clock:
//! a peer trickling one byte per kernel call cannot hold a worker past
//! the budget, even though no single call ever hits `SO_RCVTIMEO`.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::error::{Result, WireError};

/// Read exactly `buf.len()` bytes within `budget`.
pub fn recv_exact<S: Read>(stream: &mut S, buf: &mut [u8], budget: Duration) -> Result<()> {
    let start = Instant::now();
    let mut filled = 0;
    while filled < buf.len() {
        if start.elapsed() >= budget {
            return Err(WireError::Timeout);
        }
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(WireError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(WireError::Timeout)
            }
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    Ok(())
}

/// Write exactly `buf.len()` bytes within `budget`.
pub fn send_exact<S: Write>(stream: &mut S, buf: &[u8], budget: Duration) -> Result<()> {
    let start = Instant::now();
    let mut sent = 0;
    while sent < buf.len() {
        if start.elapsed() >= budget {
            return Err(WireError::Timeout);
        }
        match stream.write(&buf[sent..]) {
            Ok(0) => return Err(WireError::ConnectionClosed),
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(WireError::Timeout)
            }
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    Ok(())
}
