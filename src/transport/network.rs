//! # Network Transport
//!
//! Sends the command stream over a raw TCP connection, the "RAW" or
//! "JetDirect" service most Ethernet receipt printers expose on port 9100.
//!
//! ## Chunked Writes
//!
//! Large streams are written in 4096-byte chunks so a slow printer applies
//! backpressure per chunk instead of stalling one huge write. The socket is
//! flushed and shut down for writing before returning.

use std::io::Write;
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use super::Sink;
use crate::error::MultitoneError;

/// Raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Default connect timeout (seconds)
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// # TCP Printer Transport
///
/// ```no_run
/// use multitone::transport::{NetworkTransport, Sink};
///
/// let mut printer = NetworkTransport::connect("192.168.1.50")?;
/// printer.write_all(&[0x1D, 0x56, 0x41, 0x00])?;
/// # Ok::<(), multitone::error::MultitoneError>(())
/// ```
#[derive(Debug)]
pub struct NetworkTransport {
    stream: TcpStream,
    peer: SocketAddr,
    chunk_size: usize,
}

impl NetworkTransport {
    /// Connect to `host` or `host:port` (port 9100 when omitted).
    pub fn connect(target: &str) -> Result<Self, MultitoneError> {
        Self::connect_timeout(target, Duration::from_secs(CONNECT_TIMEOUT_SECS))
    }

    /// Connect, trying each resolved address until one answers within `timeout`.
    pub fn connect_timeout(target: &str, timeout: Duration) -> Result<Self, MultitoneError> {
        let address = with_default_port(target);
        let candidates: Vec<SocketAddr> = address
            .to_socket_addrs()
            .map_err(|e| MultitoneError::Transport(format!("Failed to resolve {}: {}", address, e)))?
            .collect();

        let mut last_error = None;
        for peer in candidates {
            match TcpStream::connect_timeout(&peer, timeout) {
                Ok(stream) => {
                    info!(%peer, "Connected to printer");
                    return Ok(Self {
                        stream,
                        peer,
                        chunk_size: CHUNK_SIZE,
                    });
                }
                Err(e) => {
                    debug!(%peer, error = %e, "Connection attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(MultitoneError::Transport(match last_error {
            Some(e) => format!("Failed to connect to {}: {}", address, e),
            None => format!("No addresses found for {}", address),
        }))
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Sink for NetworkTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), MultitoneError> {
        for chunk in data.chunks(self.chunk_size) {
            self.stream
                .write_all(chunk)
                .map_err(|e| MultitoneError::Transport(format!("Write failed: {}", e)))?;
        }
        self.stream
            .flush()
            .map_err(|e| MultitoneError::Transport(format!("Flush failed: {}", e)))?;
        self.stream
            .shutdown(Shutdown::Write)
            .map_err(|e| MultitoneError::Transport(format!("Shutdown failed: {}", e)))?;

        debug!(peer = %self.peer, bytes = data.len(), "Sent command stream");
        Ok(())
    }
}

/// Append `:9100` unless the target already names a port.
fn with_default_port(target: &str) -> String {
    if target.parse::<SocketAddr>().is_ok() {
        return target.to_string();
    }
    if let Ok(IpAddr::V6(ip)) = target.parse::<IpAddr>() {
        return format!("[{}]:{}", ip, DEFAULT_PORT);
    }
    match target.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => target.to_string(),
        _ => format!("{}:{}", target, DEFAULT_PORT),
    }
}
