//! # Psephos
//!
//! A stateless, connection-oriented compute server for the cryptographic
//! side of a remote voting protocol. Clients submit length-prefixed
//! requests over a stream socket; the server executes one elliptic-curve
//! operation per connection — key generation, ballot generation with
//! Σ-protocol commitments, homomorphic addition of commitments and
//! openings, proof completion, commitment verification — and answers with
//! one length-prefixed response.
//!
//! ## Architecture
//!
//! - **`psephos-core`**: curve capability and the crypto primitives
//! - **`psephos-wire`**: framing, exact-transfer I/O, request schema
//! - **`psephos`** (this crate): producer/consumer thread pool with
//!   fan-out, the connection server, endpoints, signals and the CLI
//!
//! Ballot generation — the dominant cost — fans a single request out
//! across up to `min(pool size, copies)` workers; the last worker to
//! finish writes the response.

#![deny(unsafe_code)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dev_tracing;
pub mod endpoint;
pub mod error;
pub mod pool;
pub mod server;
pub mod signal;

pub use error::ServerError;
