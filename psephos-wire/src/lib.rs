//! Psephos Wire
//!
//! The protocol layer of the psephos compute server:
//! - exact-transfer socket I/O with aggregate timeouts (`io`)
//! - 4-byte big-endian length framing (`frame`)
//! - the tagged request/response schema and its binary codec (`schema`)
//!
//! The codec is symmetric: clients (and the test suite) encode requests
//! and decode responses with the same functions the server uses.

#![deny(unsafe_code)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod frame;
pub mod io;
pub mod schema;

pub use error::{Result, WireError};
pub use schema::{Request, Response};
