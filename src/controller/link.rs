//! Device link
//!
//! Controller end of one device connection. A reader thread drains the
//! socket: PINGs only refresh the liveness timestamp, every other message
//! is forwarded over a channel to whoever is waiting for replies.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{PinwireError, Result};
use crate::pin::Level;
use crate::protocol::{read_message, write_message, Command, Message, MessageType};

/// A connected device, seen from the controller
pub struct DeviceLink {
    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Inbound non-PING messages from the reader thread
    inbound: Receiver<Message>,

    /// Time the last PING arrived (connection time until the first one)
    last_ping: Arc<Mutex<Instant>>,

    /// Cleared by the reader thread when the stream ends
    connected: Arc<AtomicBool>,

    reader_thread: Option<JoinHandle<()>>,

    /// Set when a request timed out: a late reply could still arrive, so
    /// later replies can no longer be matched to their requests
    desynced: bool,

    ack_timeout: Duration,
    expect_ping_within: Option<Duration>,

    /// Peer address for logging
    peer_addr: String,
}

impl DeviceLink {
    /// Block until a device connects to `listener`
    pub fn accept(listener: &TcpListener, config: &Config) -> Result<Self> {
        let (stream, _) = listener.accept()?;
        Self::from_stream(stream, config)
    }

    /// Take over an accepted stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let last_ping = Arc::new(Mutex::new(Instant::now()));
        let connected = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel::unbounded();

        let reader_thread = {
            let last_ping = Arc::clone(&last_ping);
            let connected = Arc::clone(&connected);
            let peer_addr = peer_addr.clone();
            let max_payload = config.max_payload_size;
            thread::Builder::new()
                .name(format!("pinwire-link-{}", peer_addr))
                .spawn(move || {
                    reader_loop(read_stream, max_payload, &tx, last_ping, &peer_addr);
                    // Must flip before `tx` drops
                    connected.store(false, Ordering::Release);
                })?
        };

        tracing::info!("Device connected from {}", peer_addr);

        Ok(Self {
            writer: BufWriter::new(stream),
            inbound: rx,
            last_ping,
            connected,
            reader_thread: Some(reader_thread),
            desynced: false,
            ack_timeout: Duration::from_millis(config.ack_timeout_ms),
            expect_ping_within: config.expect_ping_within_ms.map(Duration::from_millis),
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Send a message without waiting for anything
    pub fn send(&mut self, message: &Message) -> Result<()> {
        if self.desynced || !self.connected.load(Ordering::Acquire) {
            return Err(PinwireError::NotConnected);
        }
        write_message(&mut self.writer, message)?;
        tracing::debug!("Sent {} to {}", message, self.peer_addr);
        Ok(())
    }

    /// Next non-PING message, `None` if nothing arrived within `timeout`
    pub fn recv(&self, timeout: Duration) -> Result<Option<Message>> {
        match self.inbound.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(PinwireError::NotConnected),
        }
    }

    /// Collect replies until the device acknowledges
    ///
    /// Returns the messages that preceded APPROVAL_SIGNAL. An ERROR_SIGNAL
    /// fails with its description. A timeout leaves the link desynchronised:
    /// every later send fails with `NotConnected`.
    pub fn wait_acknowledgement(&mut self, timeout: Duration) -> Result<Vec<Message>> {
        let deadline = Instant::now() + timeout;
        let mut replies = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let message = match self.recv(remaining)? {
                Some(message) => message,
                None => {
                    tracing::warn!(
                        "No acknowledgement from {} within {:?}, link desynchronised",
                        self.peer_addr,
                        timeout
                    );
                    self.desynced = true;
                    return Err(PinwireError::Timeout("acknowledgement".to_string()));
                }
            };

            match message.message_type() {
                MessageType::ApprovalSignal => {
                    tracing::debug!("Approval signal received from {}", self.peer_addr);
                    return Ok(replies);
                }
                MessageType::ErrorSignal => {
                    let description = message.as_text().unwrap_or("<unreadable>").to_string();
                    tracing::warn!("Error signal received from {}: {}", self.peer_addr, description);
                    return Err(PinwireError::Rejected(description));
                }
                _ => replies.push(message),
            }
        }
    }

    /// Send a message and wait for its acknowledgement
    ///
    /// Unsolicited messages still queued from earlier are discarded first.
    pub fn request(&mut self, message: &Message) -> Result<Vec<Message>> {
        self.discard_pending();
        self.send(message)?;
        self.wait_acknowledgement(self.ack_timeout)
    }

    /// Drive a device pin
    pub fn write_pin(&mut self, pin: u8, level: Level) -> Result<()> {
        let replies = self.request(&Message::esp_command(Command::write(pin, level)))?;
        for reply in replies {
            tracing::warn!("Unexpected reply to pin write from {}: {}", self.peer_addr, reply);
        }
        Ok(())
    }

    /// Read a device pin
    pub fn read_pin(&mut self, pin: u8) -> Result<Level> {
        let replies = self.request(&Message::esp_command(Command::read(pin)))?;
        let reply = replies
            .iter()
            .find(|m| m.message_type() == MessageType::Int)
            .ok_or_else(|| PinwireError::UnexpectedReply(format!("no INT reply for pin {}", pin)))?;

        match reply.as_int()? {
            0 => Ok(Level::Low),
            1 => Ok(Level::High),
            other => Err(PinwireError::UnexpectedReply(format!(
                "pin {} reported level {}",
                pin, other
            ))),
        }
    }

    /// Whether an acknowledgement timeout broke request/reply pairing
    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    fn discard_pending(&self) {
        while let Ok(stale) = self.inbound.try_recv() {
            tracing::warn!("Discarding unsolicited {} from {}", stale, self.peer_addr);
        }
    }

    /// When the device last pinged
    pub fn last_ping(&self) -> Instant {
        *self.last_ping.lock()
    }

    /// Connected, in sync, and pinging within the configured window if one is set
    pub fn is_alive(&self) -> bool {
        if self.desynced || !self.connected.load(Ordering::Acquire) {
            return false;
        }
        match self.expect_ping_within {
            Some(window) => self.last_ping().elapsed() <= window,
            None => true,
        }
    }
}

impl Drop for DeviceLink {
    fn drop(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
        tracing::debug!("Link to {} closed", self.peer_addr);
    }
}

fn reader_loop(
    stream: TcpStream,
    max_payload: u64,
    tx: &Sender<Message>,
    last_ping: Arc<Mutex<Instant>>,
    peer_addr: &str,
) {
    let mut reader = BufReader::new(stream);

    loop {
        let message = match read_message(&mut reader, max_payload) {
            Ok(message) => message,
            Err(e) if e.is_disconnect() => {
                tracing::debug!("Device {} disconnected", peer_addr);
                return;
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", peer_addr, e);
                return;
            }
        };

        if message.message_type() == MessageType::Ping {
            tracing::trace!("Ping from {}", peer_addr);
            *last_ping.lock() = Instant::now();
            continue;
        }

        tracing::trace!("Received {} from {}", message, peer_addr);
        if tx.send(message).is_err() {
            return;
        }
    }
}
