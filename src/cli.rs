//! Command-line interface.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::transfer::DEFAULT_CHUNK_SIZE;

/// Default TCP port of the historical protocol.
pub const DEFAULT_PORT: u16 = 3214;

/// Utility to send files via direct connection.
///
/// One side listens, the other connects; whichever side was given files
/// with `--file` sends them, the other stores what arrives.
#[derive(Debug, Parser)]
#[command(name = "siphon", version, about)]
#[command(group = ArgGroup::new("mode").required(true).args(["listen", "connect"]))]
pub struct Cli {
    /// Wait for a peer to connect instead of connecting out.
    #[arg(short, long)]
    pub listen: bool,

    /// Connect to a listening peer at this host.
    #[arg(short, long, value_name = "HOST")]
    pub connect: Option<String>,

    /// TCP port to listen on or connect to.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// File to send; repeat to queue several files.
    #[arg(short, long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Chunk size in bytes for the transfer loop.
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub buffer: usize,

    /// Directory where received files are stored.
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,
}

impl Cli {
    /// Files queued with `--file` select the sending role.
    pub fn is_sender(&self) -> bool {
        !self.files.is_empty()
    }
}
