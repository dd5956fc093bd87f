//! TCP transport
//!
//! Buffered TCP stream used by the device to reach its controller.

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::Transport;
use crate::error::{is_disconnect_kind, Result};

/// A TCP connection to the controller
pub struct TcpTransport {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    connected: bool,
}

impl TcpTransport {
    /// Connect to a controller
    ///
    /// A single attempt; retrying is left to the caller.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm: frames are small and latency-sensitive
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Transport connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            connected: true,
        })
    }

    /// Configure socket timeouts (0 leaves the operation blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn track<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if let Err(ref e) = result {
            if is_disconnect_kind(e.kind()) {
                tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                self.connected = false;
            }
        }
        result
    }
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.reader.read(buf);
        if matches!(result, Ok(0)) && !buf.is_empty() {
            tracing::debug!("Peer {} closed the connection", self.peer_addr);
            self.connected = false;
        }
        self.track(result)
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.writer.write(buf);
        self.track(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.writer.flush();
        self.track(result)
    }
}

impl Transport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn bytes_available(&mut self) -> Result<bool> {
        if !self.connected {
            return Ok(false);
        }
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }

        // Peek without blocking; blocking mode must be back before any
        // result propagates, read_exact relies on it
        let stream = self.reader.get_ref();
        stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let peeked = stream.peek(&mut probe);
        let restored = stream.set_nonblocking(false);
        if let Err(e) = restored {
            tracing::error!("Could not restore blocking mode on {}: {}", self.peer_addr, e);
            self.connected = false;
            return Err(e.into());
        }

        match peeked {
            Ok(0) => {
                tracing::debug!("Peer {} closed the connection", self.peer_addr);
                self.connected = false;
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(e) if is_disconnect_kind(e.kind()) => {
                tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                self.connected = false;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
