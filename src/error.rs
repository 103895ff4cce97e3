//! Error taxonomy for one transfer session.
//!
//! Every error is local to a single run: nothing is retried, and the only
//! recovery action anywhere is writing a FAIL terminator so the peer fails
//! the session too.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resolve, bind, connect or accept failed before any data moved.
    #[error("connection failed: {0}")]
    Connection(#[source] std::io::Error),

    /// Host name did not resolve to any usable address.
    #[error("unable to resolve host {host}")]
    Resolve { host: String },

    /// A source or destination file could not be opened or inspected.
    #[error("unable to open file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Platform error on the read side, mid-transfer.
    #[error("unable to read source after {bytes} bytes: {source}")]
    Read {
        bytes: u64,
        #[source]
        source: std::io::Error,
    },

    /// Platform error on the write side, mid-transfer.
    #[error("unable to write data after {bytes} bytes: {source}")]
    Write {
        bytes: u64,
        #[source]
        source: std::io::Error,
    },

    /// The stream ended before the requested byte count was satisfied.
    /// Counts are `u64` so rebasing them onto a multi-gigabyte copy never
    /// truncates, whatever the pointer width.
    #[error("stream ended after {got} of {want} bytes")]
    ShortTransfer { got: u64, want: u64 },

    /// The peer sent bytes that do not form a valid frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer terminated the session with a FAIL marker.
    #[error("peer reported transfer failure")]
    RemoteFailure,
}

pub type Result<T> = std::result::Result<T, Error>;
