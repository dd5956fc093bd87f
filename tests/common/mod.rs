//! Shared test doubles: an in-memory transport and a recording pin actuator.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};

use pinwire::pin::{Level, PinActuator, PinFault, PinMode};
use pinwire::protocol::{encode_message, read_message, Message, MAX_PAYLOAD_SIZE};
use pinwire::transport::Transport;

// =============================================================================
// In-memory transport
// =============================================================================

/// Transport backed by an inbound byte queue and an outbound byte log
pub struct MockTransport {
    inbound: Cursor<Vec<u8>>,
    outbound: Vec<u8>,
    connected: bool,
    close_when_drained: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: Cursor::new(Vec::new()),
            outbound: Vec::new(),
            connected: true,
            close_when_drained: false,
        }
    }

    pub fn with_messages(messages: &[Message]) -> Self {
        let mut transport = Self::new();
        for message in messages {
            transport.push(message);
        }
        transport
    }

    /// Report disconnected once every inbound byte has been read
    pub fn close_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }

    /// Queue an inbound message
    pub fn push(&mut self, message: &Message) {
        self.push_bytes(&encode_message(message));
    }

    /// Queue raw inbound bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.inbound.get_mut().extend_from_slice(bytes);
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn drained(&self) -> bool {
        self.inbound.position() as usize >= self.inbound.get_ref().len()
    }

    pub fn sent_bytes(&self) -> &[u8] {
        &self.outbound
    }

    /// Decode everything written so far
    pub fn sent(&self) -> Vec<Message> {
        let mut cursor = Cursor::new(&self.outbound[..]);
        let mut messages = Vec::new();
        while (cursor.position() as usize) < self.outbound.len() {
            messages.push(read_message(&mut cursor, MAX_PAYLOAD_SIZE).unwrap());
        }
        messages
    }

    /// Decode and clear everything written so far
    pub fn take_sent(&mut self) -> Vec<Message> {
        let messages = self.sent();
        self.outbound.clear();
        messages
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.connected {
            return Ok(0);
        }
        self.inbound.read(buf)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock closed"));
        }
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn bytes_available(&mut self) -> pinwire::Result<bool> {
        if self.drained() && self.close_when_drained {
            self.connected = false;
        }
        Ok(self.connected && !self.drained())
    }
}

// =============================================================================
// Recording actuator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    SetMode(u8, PinMode),
    Write(u8, Level),
    Read(u8),
}

/// Actuator that records every call and returns scripted levels
#[derive(Default)]
pub struct RecordingPins {
    pub calls: Vec<PinCall>,
    pub levels: HashMap<u8, Level>,
    pub fail_with: Option<PinFault>,
}

impl RecordingPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, pin: u8, level: Level) -> Self {
        self.levels.insert(pin, level);
        self
    }

    pub fn failing(fault: PinFault) -> Self {
        Self {
            fail_with: Some(fault),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), PinFault> {
        match &self.fail_with {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

impl PinActuator for RecordingPins {
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), PinFault> {
        self.calls.push(PinCall::SetMode(pin, mode));
        self.check()
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), PinFault> {
        self.calls.push(PinCall::Write(pin, level));
        self.check()
    }

    fn read(&mut self, pin: u8) -> Result<Level, PinFault> {
        self.calls.push(PinCall::Read(pin));
        self.check()?;
        Ok(self.levels.get(&pin).copied().unwrap_or_default())
    }
}
