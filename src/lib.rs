//! siphon - send files to a peer over a single direct TCP connection.
//!
//! One side listens, the other connects; files stream across as
//! START-framed chunked copies followed by a terminator exchange that
//! settles the outcome of the whole session for both peers.
//!
//! Everything is synchronous and blocking: one connection, one thread,
//! no timeouts. A stalled peer blocks the process indefinitely.

pub mod cli;
pub mod error;
pub mod io;
pub mod net;
pub mod progress;
pub mod protocol;
pub mod session;
pub mod transfer;

pub use error::{Error, Result};
