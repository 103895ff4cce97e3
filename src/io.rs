//! Byte-exact stream I/O.
//!
//! Raw stream reads and writes are permitted to move fewer bytes than
//! requested. Every framing and transfer operation sits on these two
//! loops, which either move the exact requested count or fail.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};

/// Write the whole buffer, looping over partial writes.
///
/// A write call reporting 0 bytes means the peer closed the stream and is
/// surfaced as [`Error::ShortTransfer`].
pub fn write_full<W: Write + ?Sized>(w: &mut W, buf: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match w.write(&buf[written..]) {
            Ok(0) => {
                return Err(Error::ShortTransfer {
                    got: written as u64,
                    want: buf.len() as u64,
                })
            }
            Ok(n) => written += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Write {
                    bytes: written as u64,
                    source,
                })
            }
        }
    }
    Ok(written)
}

/// Fill the whole buffer, looping over partial reads.
///
/// EOF before the buffer is full is surfaced as [`Error::ShortTransfer`].
pub fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::ShortTransfer {
                    got: filled as u64,
                    want: buf.len() as u64,
                })
            }
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Read {
                    bytes: filled as u64,
                    source,
                })
            }
        }
    }
    Ok(filled)
}
