//! Frame types for the transfer protocol.
//!
//! Wire format: one block-type byte, then for START the raw file name
//! bytes, a newline delimiter, and the 8-byte file size in the sender's
//! native byte order.
//!
//! ```text
//! Frame      ::= StartFrame | EndFrame | FailFrame
//! StartFrame ::= 0x01 <file_name bytes> 0x0A <file_size: 8 bytes, native-endian>
//! EndFrame   ::= 0x02
//! FailFrame  ::= 0x03
//! ```
//!
//! A session is zero or more StartFrame+payload pairs followed by exactly
//! one terminator byte in each direction.
//!
//! The native-endian size field is the historical wire format and is kept
//! for compatibility: peers of different endianness cannot interoperate.
//! Historically END and FAIL shared the byte 0x02; this codec gives FAIL
//! its own value so a peer can tell a failed session from a finished one.

use bytes::{BufMut, BytesMut};
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::io::{read_full, write_full};

/// Longest accepted file name in bytes, delimiter excluded. A corrupt peer
/// that never sends the newline is cut off here instead of growing the
/// name buffer forever.
pub const MAX_NAME_LEN: usize = 4096;

/// Block-type byte opening every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockType {
    FileStart = 0x01,
    End = 0x02,
    Fail = 0x03,
}

impl BlockType {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::FileStart),
            0x02 => Some(Self::End),
            0x03 => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A file follows: `file_size` payload bytes directly after the header.
    Start { file_name: String, file_size: u64 },
    /// No more files; the sending side finished cleanly.
    End,
    /// No more files; the sending side failed and the session is failed.
    Fail,
}

/// Write a START frame announcing `file_size` payload bytes for `file_name`.
///
/// The newline is the sole delimiter of the name, so names containing a
/// newline byte are rejected rather than put on the wire unframeable.
pub fn write_start<W: Write + ?Sized>(w: &mut W, file_name: &str, file_size: u64) -> Result<()> {
    let name = file_name.as_bytes();
    if name.contains(&b'\n') {
        return Err(Error::Protocol(format!(
            "file name contains a newline byte: {file_name:?}"
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::Protocol(format!(
            "file name longer than {MAX_NAME_LEN} bytes"
        )));
    }

    let mut buf = BytesMut::with_capacity(1 + name.len() + 1 + 8);
    buf.put_u8(BlockType::FileStart as u8);
    buf.put_slice(name);
    buf.put_u8(b'\n');
    buf.put_u64_ne(file_size);
    write_full(w, &buf)?;
    Ok(())
}

/// Write the terminator frame: END if `ok`, FAIL otherwise.
pub fn write_terminator<W: Write + ?Sized>(w: &mut W, ok: bool) -> Result<()> {
    let block = if ok { BlockType::End } else { BlockType::Fail };
    write_full(w, &[block as u8])?;
    Ok(())
}

/// Read one frame header from the stream.
pub fn read_frame<R: Read + ?Sized>(r: &mut R) -> Result<Frame> {
    let mut block = [0u8; 1];
    read_full(r, &mut block)?;

    match BlockType::from_u8(block[0]) {
        Some(BlockType::FileStart) => {
            let file_name = read_name(r)?;
            let mut size = [0u8; 8];
            read_full(r, &mut size)?;
            Ok(Frame::Start {
                file_name,
                file_size: u64::from_ne_bytes(size),
            })
        }
        Some(BlockType::End) => Ok(Frame::End),
        Some(BlockType::Fail) => Ok(Frame::Fail),
        None => Err(Error::Protocol(format!(
            "unknown block type 0x{:02x}",
            block[0]
        ))),
    }
}

/// Read the newline-delimited file name, bounded by [`MAX_NAME_LEN`].
fn read_name<R: Read + ?Sized>(r: &mut R) -> Result<String> {
    let mut name = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        read_full(r, &mut byte)?;
        if byte[0] == b'\n' {
            break;
        }
        if name.len() == MAX_NAME_LEN {
            return Err(Error::Protocol(format!(
                "file name delimiter not found within {MAX_NAME_LEN} bytes"
            )));
        }
        name.push(byte[0]);
    }
    String::from_utf8(name).map_err(|_| Error::Protocol("file name is not valid UTF-8".into()))
}
