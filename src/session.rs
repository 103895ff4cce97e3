//! Session orchestration: one connection, a queue of files, a terminator
//! exchange.
//!
//! Both roles walk the same states: connect-or-accept, the per-file loop,
//! the terminator exchange, done. There are no retries anywhere; the first
//! failure aborts the remaining queue and is answered with a FAIL
//! terminator so the peer fails the session as well.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::net::Connection;
use crate::progress::ProgressReporter;
use crate::protocol::{self, Frame};
use crate::transfer::{copy_exact, TransferDescriptor};

/// Send every queued file over the connection, then exchange terminators.
///
/// The session succeeds only if the local queue completed and the peer
/// answered with END.
pub fn send_files(conn: &mut Connection, files: &[PathBuf], chunk_size: usize) -> Result<()> {
    let mut outcome = Ok(());
    for path in files {
        if let Err(e) = send_one(conn, path, chunk_size) {
            error!(path = %path.display(), error = %e, "transfer failed");
            outcome = Err(e);
            break;
        }
    }

    let wrote = protocol::write_terminator(conn.stream(), outcome.is_ok());
    // Half-close before waiting for the answer: a receiver still blocked
    // in its payload copy (short payload, mid-copy failure) unblocks on
    // EOF, ends its loop and sends the answering terminator.
    conn.shutdown_write();
    let remote = match wrote {
        Ok(()) => read_peer_terminator(conn),
        Err(_) => Ok(()),
    };
    conn.shutdown();
    outcome.and(wrote).and(remote)
}

fn send_one(conn: &mut Connection, path: &Path, chunk_size: usize) -> Result<()> {
    let file_name = base_name(path)?;
    let mut file = File::open(path).map_err(|source| Error::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file_size = file
        .metadata()
        .map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    protocol::write_start(conn.stream(), &file_name, file_size)?;

    let desc = TransferDescriptor {
        offset: 0,
        length: file_size,
    };
    file.seek(SeekFrom::Start(desc.offset))
        .map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;

    let mut progress = ProgressReporter::new(&file_name, file_size);
    let copied = copy_exact(
        &mut file,
        conn.stream(),
        desc.length,
        chunk_size,
        &mut progress,
    );
    match copied {
        Ok(bytes) => {
            progress.finish();
            info!(file = %file_name, bytes, "sent");
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}

/// Receive files into `directory` until the peer's terminator arrives,
/// then answer with this side's terminator.
pub fn receive_files(conn: &mut Connection, directory: &Path, chunk_size: usize) -> Result<()> {
    let mut outcome = Ok(());
    loop {
        match protocol::read_frame(conn.stream()) {
            Ok(Frame::Start {
                file_name,
                file_size,
            }) => {
                if let Err(e) = receive_one(conn, directory, &file_name, file_size, chunk_size) {
                    error!(file = %file_name, error = %e, "transfer failed");
                    outcome = Err(e);
                    break;
                }
            }
            Ok(Frame::End) => break,
            Ok(Frame::Fail) => {
                outcome = Err(Error::RemoteFailure);
                break;
            }
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    let wrote = protocol::write_terminator(conn.stream(), outcome.is_ok());
    conn.shutdown();
    outcome.and(wrote)
}

fn receive_one(
    conn: &mut Connection,
    directory: &Path,
    file_name: &str,
    file_size: u64,
    chunk_size: usize,
) -> Result<()> {
    let path = receive_path(directory, file_name)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|source| Error::File {
            path: path.clone(),
            source,
        })?;

    let mut progress = ProgressReporter::new(file_name, file_size);
    let copied = copy_exact(
        conn.stream(),
        &mut file,
        file_size,
        chunk_size,
        &mut progress,
    );
    match copied {
        Ok(bytes) => {
            progress.finish();
            info!(file = %file_name, bytes, expected = file_size, "received");
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}

/// The sender's terminator was consumed by the receive loop; the sender in
/// turn learns the receiver's outcome from the answering terminator.
fn read_peer_terminator(conn: &mut Connection) -> Result<()> {
    match protocol::read_frame(conn.stream()) {
        Ok(Frame::End) => Ok(()),
        Ok(Frame::Fail) => Err(Error::RemoteFailure),
        Ok(Frame::Start { .. }) => Err(Error::Protocol(
            "unexpected START frame in terminator exchange".into(),
        )),
        Err(e) => Err(e),
    }
}

/// Base name sent on the wire: the last path component only.
fn base_name(path: &Path) -> Result<String> {
    let name = path.file_name().ok_or_else(|| Error::File {
        path: path.to_path_buf(),
        source: std::io::Error::other("path has no file name"),
    })?;
    Ok(name.to_string_lossy().into_owned())
}

/// Destination path: the receive directory joined with the bare file name
/// from the wire. Path components a hostile peer smuggled into the name
/// are dropped so the name cannot escape the directory.
fn receive_path(directory: &Path, file_name: &str) -> Result<PathBuf> {
    let base = Path::new(file_name)
        .file_name()
        .ok_or_else(|| Error::Protocol(format!("unusable file name on wire: {file_name:?}")))?;
    Ok(directory.join(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name(Path::new("/home/user/a.txt")).unwrap(), "a.txt");
        assert_eq!(base_name(Path::new("b.bin")).unwrap(), "b.bin");
        assert!(base_name(Path::new("/")).is_err());
    }

    #[test]
    fn receive_path_confines_to_directory() {
        let dir = Path::new("/tmp/recv");
        assert_eq!(
            receive_path(dir, "a.txt").unwrap(),
            PathBuf::from("/tmp/recv/a.txt")
        );
        assert_eq!(
            receive_path(dir, "../../etc/passwd").unwrap(),
            PathBuf::from("/tmp/recv/passwd")
        );
        assert!(receive_path(dir, "..").is_err());
        assert!(receive_path(dir, "").is_err());
    }
}
