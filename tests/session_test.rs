//! End-to-end sessions over real sockets on ephemeral ports.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use siphon::net::{Connection, Listener};
use siphon::session::{receive_files, send_files};
use siphon::Error;
use tempfile::TempDir;

const CHUNK: usize = 1024;

/// Bind an ephemeral port and run a receiver session on a thread.
fn spawn_receiver(dir: PathBuf) -> (u16, JoinHandle<siphon::Result<()>>) {
    let listener = Listener::bind(0).expect("bind ephemeral port");
    let port = listener.local_port().expect("local port");
    let handle = thread::spawn(move || {
        let mut conn = listener.accept_one()?;
        receive_files(&mut conn, &dir, CHUNK)
    });
    (port, handle)
}

fn run_sender(port: u16, files: &[PathBuf]) -> siphon::Result<()> {
    let mut conn = Connection::connect("127.0.0.1", port)?;
    send_files(&mut conn, files, CHUNK)
}

#[test]
fn two_files_transfer_end_to_end() {
    let src = TempDir::new().unwrap();
    let recv = TempDir::new().unwrap();

    let a = src.path().join("a.txt");
    let b = src.path().join("b.bin");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "").unwrap();

    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());
    run_sender(port, &[a, b]).expect("sender session");
    receiver.join().unwrap().expect("receiver session");

    assert_eq!(fs::read_to_string(recv.path().join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read(recv.path().join("b.bin")).unwrap(), b"");
}

#[test]
fn zero_length_file_transfers() {
    let src = TempDir::new().unwrap();
    let recv = TempDir::new().unwrap();

    let empty = src.path().join("empty.dat");
    fs::write(&empty, "").unwrap();

    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());
    run_sender(port, &[empty]).unwrap();
    receiver.join().unwrap().unwrap();

    let meta = fs::metadata(recv.path().join("empty.dat")).unwrap();
    assert_eq!(meta.len(), 0);
}

#[test]
fn chunk_boundary_sizes_transfer_byte_exactly() {
    let src = TempDir::new().unwrap();
    let recv = TempDir::new().unwrap();

    // Exactly one chunk and one chunk plus one byte.
    let exact: Vec<u8> = (0..CHUNK).map(|i| (i % 251) as u8).collect();
    let plus_one: Vec<u8> = (0..CHUNK + 1).map(|i| (i % 197) as u8).collect();

    let p1 = src.path().join("exact.bin");
    let p2 = src.path().join("plus_one.bin");
    fs::write(&p1, &exact).unwrap();
    fs::write(&p2, &plus_one).unwrap();

    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());
    run_sender(port, &[p1, p2]).unwrap();
    receiver.join().unwrap().unwrap();

    assert_eq!(fs::read(recv.path().join("exact.bin")).unwrap(), exact);
    assert_eq!(fs::read(recv.path().join("plus_one.bin")).unwrap(), plus_one);
}

#[test]
fn large_file_transfers_across_many_chunks() {
    let src = TempDir::new().unwrap();
    let recv = TempDir::new().unwrap();

    let data: Vec<u8> = (0..64 * 1024 + 17).map(|i| (i * 31 % 256) as u8).collect();
    let big = src.path().join("big.bin");
    fs::write(&big, &data).unwrap();

    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());
    run_sender(port, &[big]).unwrap();
    receiver.join().unwrap().unwrap();

    assert_eq!(fs::read(recv.path().join("big.bin")).unwrap(), data);
}

#[test]
fn missing_source_fails_sender_and_receiver() {
    let recv = TempDir::new().unwrap();

    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());
    let gone = PathBuf::from("/nonexistent/deleted-after-listing.txt");
    let sender_result = run_sender(port, &[gone]);

    match sender_result {
        Err(Error::File { .. }) => {}
        other => panic!("expected File error on sender, got {other:?}"),
    }
    match receiver.join().unwrap() {
        Err(Error::RemoteFailure) => {}
        other => panic!("expected RemoteFailure on receiver, got {other:?}"),
    }
}

#[test]
fn missing_receive_directory_fails_both_sides() {
    let src = TempDir::new().unwrap();
    let a = src.path().join("a.txt");
    fs::write(&a, "hello").unwrap();

    let missing_dir = Path::new("/nonexistent/recv/dir").to_path_buf();
    let (port, receiver) = spawn_receiver(missing_dir);
    let sender_result = run_sender(port, &[a]);

    // The receiver aborts on file open; the sender learns about it from
    // the answering FAIL terminator, or from the torn-down connection if
    // the FAIL byte was lost to the reset.
    assert!(sender_result.is_err());
    match receiver.join().unwrap() {
        Err(Error::File { .. }) => {}
        other => panic!("expected File error on receiver, got {other:?}"),
    }
}

#[test]
fn short_payload_fails_session_without_hanging() {
    let recv = TempDir::new().unwrap();
    let (port, receiver) = spawn_receiver(recv.path().to_path_buf());

    // A sender whose source shrank after the header went out: announces
    // ten bytes, delivers five, then terminates and half-closes, exactly
    // the wire behavior of send_files after a benign-short copy. The
    // half-close is what unblocks the receiver's payload copy; without it
    // both peers would sit waiting on each other forever.
    let mut conn = Connection::connect("127.0.0.1", port).unwrap();
    siphon::protocol::write_start(conn.stream(), "short.bin", 10).unwrap();
    siphon::io::write_full(conn.stream(), b"hello").unwrap();
    siphon::protocol::write_terminator(conn.stream(), true).unwrap();
    conn.shutdown_write();
    let answer = siphon::protocol::read_frame(conn.stream()).unwrap();
    conn.shutdown();

    // The receiver ends up desynchronized after the short payload and
    // answers FAIL rather than hanging.
    assert_eq!(answer, siphon::protocol::Frame::Fail);
    assert!(receiver.join().unwrap().is_err());
}

#[test]
fn hostile_file_name_cannot_escape_receive_directory() {
    let recv = TempDir::new().unwrap();
    let outside = recv.path().join("escaped.txt");

    let (port, receiver) = spawn_receiver(recv.path().join("inner"));
    fs::create_dir(recv.path().join("inner")).unwrap();

    // Hand-roll a session whose START frame carries path components.
    let mut conn = Connection::connect("127.0.0.1", port).unwrap();
    siphon::protocol::write_start(conn.stream(), "../escaped.txt", 5).unwrap();
    siphon::io::write_full(conn.stream(), b"hello").unwrap();
    siphon::protocol::write_terminator(conn.stream(), true).unwrap();
    let _ = siphon::protocol::read_frame(conn.stream());
    conn.shutdown();

    receiver.join().unwrap().unwrap();
    assert!(!outside.exists(), "file escaped the receive directory");
    assert_eq!(
        fs::read_to_string(recv.path().join("inner/escaped.txt")).unwrap(),
        "hello"
    );
}
