//! Chunked copy between two byte streams.
//!
//! Reads bounded chunks from the source and flushes each one to the
//! destination with a full-write loop, reporting cumulative progress to an
//! injected observer after every chunk.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::io::write_full;

/// Default chunk size, matching the historical 0x1400-byte buffer.
pub const DEFAULT_CHUNK_SIZE: usize = 0x1400;

/// One bulk copy: `length` payload bytes starting at `offset` of the
/// source. The offset is honored by seeking the source before the copy;
/// it is always zero today and exists for partial transfers later.
#[derive(Debug, Clone, Copy)]
pub struct TransferDescriptor {
    pub offset: u64,
    pub length: u64,
}

/// Receives cumulative byte counts as a copy progresses.
pub trait TransferObserver {
    fn on_progress(&mut self, bytes_so_far: u64);
}

/// Observer for callers that do not render progress.
pub struct NullObserver;

impl TransferObserver for NullObserver {
    fn on_progress(&mut self, _bytes_so_far: u64) {}
}

/// Copy `length` bytes from `src` to `dest` in chunks of at most
/// `chunk_size` bytes. Returns the number of bytes moved.
///
/// A read of 0 bytes before `length` is reached is treated as benign
/// end-of-stream: the copy stops and the short total is returned
/// successfully. That leniency is the historical behavior of the protocol
/// and callers relying on exact lengths must compare the returned count.
pub fn copy_exact<R, W>(
    src: &mut R,
    dest: &mut W,
    length: u64,
    chunk_size: usize,
    observer: &mut dyn TransferObserver,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    while total < length {
        let want = (length - total).min(buf.len() as u64) as usize;
        let n = match src.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Read {
                    bytes: total,
                    source,
                })
            }
        };
        if n == 0 {
            // No more data.
            break;
        }
        write_full(dest, &buf[..n]).map_err(|e| at_offset(e, total))?;
        total += n as u64;
        observer.on_progress(total);
    }

    Ok(total)
}

/// Rebase the byte counts of a chunk-local write error onto the whole copy.
fn at_offset(e: Error, total: u64) -> Error {
    match e {
        Error::Write { bytes, source } => Error::Write {
            bytes: total + bytes,
            source,
        },
        Error::ShortTransfer { got, want } => Error::ShortTransfer {
            got: total + got,
            want: total + want,
        },
        other => other,
    }
}
