// Single-client, non-blocking TCP command channel for the gesture client
//
// Polled exactly once per tick. Accept is only attempted while no client is
// held, so a second client waits in the backlog until the first one leaves.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{debug, info, warn};

use crate::config::RECV_BUFFER_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to bind command listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result of one non-blocking read on the client socket
#[derive(Debug)]
pub enum ReadOutcome {
    Ready(String),
    WouldBlock,
    Closed,
    Error(io::Error),
}

/// What happened on the channel this tick
#[derive(Debug)]
pub enum ChannelEvent {
    Idle,
    Connected(SocketAddr),
    Command(String),
    /// Peer closed the connection (zero-byte read)
    Disconnected,
    /// Socket error; the connection has already been dropped
    Fault(io::Error),
}

pub struct CommandChannel {
    listener: TcpListener,
    client: Option<(TcpStream, SocketAddr)>,
    buffer: [u8; RECV_BUFFER_SIZE],
}

impl CommandChannel {
    pub fn bind(addr: &str) -> Result<Self, ChannelError> {
        let listener = TcpListener::bind(addr).map_err(|source| ChannelError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        listener.set_nonblocking(true)?;
        info!("Gesture control server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            client: None,
            buffer: [0u8; RECV_BUFFER_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.client.as_ref().map(|(_, addr)| *addr)
    }

    /// Poll once: accept if idle, otherwise try to read one token
    pub fn poll(&mut self) -> ChannelEvent {
        let Some((stream, _)) = self.client.as_mut() else {
            return self.try_accept();
        };

        match try_read(stream, &mut self.buffer) {
            ReadOutcome::Ready(token) => ChannelEvent::Command(token),
            ReadOutcome::WouldBlock => ChannelEvent::Idle,
            ReadOutcome::Closed => {
                info!("Client disconnected");
                self.client = None;
                ChannelEvent::Disconnected
            }
            ReadOutcome::Error(e) => {
                warn!("Socket error, closing connection: {}", e);
                self.client = None;
                ChannelEvent::Fault(e)
            }
        }
    }

    fn try_accept(&mut self) -> ChannelEvent {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("Could not make client socket non-blocking, dropping {}: {}", addr, e);
                    return ChannelEvent::Idle;
                }
                info!("Client connected: {}", addr);
                self.client = Some((stream, addr));
                ChannelEvent::Connected(addr)
            }
            Err(e) if is_transient(&e) => ChannelEvent::Idle,
            Err(e) => {
                // Listener stays usable; try again next tick
                debug!("Accept failed: {}", e);
                ChannelEvent::Idle
            }
        }
    }
}

/// One non-blocking read; the whole payload is one command token
pub fn try_read<R: Read>(stream: &mut R, buffer: &mut [u8]) -> ReadOutcome {
    match stream.read(buffer) {
        Ok(0) => ReadOutcome::Closed,
        Ok(n) => ReadOutcome::Ready(String::from_utf8_lossy(&buffer[..n]).into_owned()),
        Err(e) if is_transient(&e) => ReadOutcome::WouldBlock,
        Err(e) => ReadOutcome::Error(e),
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
