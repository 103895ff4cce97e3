use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use siphon::cli::Cli;
use siphon::net::{Connection, Listener};
use siphon::session;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut conn = match &cli.connect {
        Some(host) => Connection::connect(host, cli.port)
            .with_context(|| format!("connecting to {}:{}", host, cli.port))?,
        None => Listener::bind(cli.port)
            .and_then(Listener::accept_one)
            .with_context(|| format!("waiting for a peer on port {}", cli.port))?,
    };

    if cli.is_sender() {
        session::send_files(&mut conn, &cli.files, cli.buffer)?;
    } else {
        session::receive_files(&mut conn, &cli.directory, cli.buffer)?;
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
