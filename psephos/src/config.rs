//! Server tunables.

use std::time::Duration;

/// Per-connection send/receive timeout (seconds). Applies to the
/// aggregate transfer of each frame half, not per kernel call.
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 120;

/// Listen backlog of the accepting socket.
pub const LISTEN_BACKLOG: i32 = 128;

/// How often the accept loop wakes to observe the shutdown flag.
pub const ACCEPT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Most ballot copies one task may carry; bounds the fan-out work a single
/// connection can demand.
pub const MAX_PARALLEL_BALLOTS: usize = 512;

/// Connection-server configuration.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Send/receive budget for each frame half.
    pub io_timeout: Duration,
    /// Listen backlog.
    pub backlog: i32,
    /// Accept retry interval; bounds shutdown latency.
    pub accept_retry: Duration,
    /// Upper bound on `GenBallot` copies per request.
    pub max_parallel: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS),
            backlog: LISTEN_BACKLOG,
            accept_retry: ACCEPT_RETRY_INTERVAL,
            max_parallel: MAX_PARALLEL_BALLOTS,
        }
    }
}
