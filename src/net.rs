//! Connection establishment and teardown.
//!
//! The initiator connects to a known address; the responder binds,
//! listens with a backlog of one and accepts exactly one peer. The
//! resulting [`Connection`] is owned by the session for the whole run and
//! shut down in both directions when the session ends.

use socket2::{Domain, Socket, Type};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Which side of the connection this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// The single TCP connection a session runs over.
pub struct Connection {
    stream: TcpStream,
    role: Role,
    peer: SocketAddr,
}

impl Connection {
    /// Connect to a listening peer at `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let mut addrs = (host, port).to_socket_addrs().map_err(Error::Connection)?;
        let addr = addrs.next().ok_or_else(|| Error::Resolve {
            host: host.to_string(),
        })?;
        debug!(%addr, "connecting");
        let stream = TcpStream::connect(addr).map_err(Error::Connection)?;
        info!(peer = %addr, "connected");
        Ok(Self {
            stream,
            role: Role::Initiator,
            peer: addr,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Close only the write direction. The peer sees EOF on its reads
    /// while this side can still read the answering terminator.
    pub fn shutdown_write(&self) {
        let _ = self.stream.shutdown(Shutdown::Write);
    }

    /// Shut the stream down in both directions. Shutdown errors are
    /// ignored: the peer may already have closed its end.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Bound listening socket waiting for the single peer of a run.
pub struct Listener {
    socket: Socket,
}

impl Listener {
    /// Bind `0.0.0.0:port` and listen with a backlog of one.
    pub fn bind(port: u16) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, None).map_err(Error::Connection)?;
        socket.set_reuse_address(true).map_err(Error::Connection)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        socket.bind(&addr.into()).map_err(Error::Connection)?;
        socket.listen(1).map_err(Error::Connection)?;
        debug!(port, "listening");
        Ok(Self { socket })
    }

    /// Port actually bound; differs from the requested one for port 0.
    pub fn local_port(&self) -> Result<u16> {
        let addr = self.socket.local_addr().map_err(Error::Connection)?;
        addr.as_socket()
            .map(|a| a.port())
            .ok_or_else(|| Error::Connection(std::io::Error::other("listener has no inet address")))
    }

    /// Accept exactly one peer and give up the listening socket.
    pub fn accept_one(self) -> Result<Connection> {
        let (socket, addr) = self.socket.accept().map_err(Error::Connection)?;
        let peer = addr
            .as_socket()
            .ok_or_else(|| Error::Connection(std::io::Error::other("peer has no inet address")))?;
        info!(%peer, "peer connected");
        Ok(Connection {
            stream: socket.into(),
            role: Role::Responder,
            peer,
        })
    }
}
