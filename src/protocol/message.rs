//! Message definitions
//!
//! A message is a type tag plus an owned payload. The payload length is
//! always derived from the buffer, so `length() == data().len()` holds for
//! every message, and an empty payload is stored as `None`.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Command, MessageType, PayloadShape};
use crate::error::{PinwireError, Result};

/// A protocol message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    message_type: MessageType,
    data: Option<Bytes>,
}

impl Message {
    /// Build a message from a tag and a raw payload
    ///
    /// Used by the parser; no shape check is applied here.
    pub fn from_parts(message_type: MessageType, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            message_type,
            data: if data.is_empty() { None } else { Some(data) },
        }
    }

    fn signal(message_type: MessageType) -> Self {
        Self {
            message_type,
            data: None,
        }
    }

    /// NUL-terminated text payload; text after an interior NUL is dropped
    fn text(message_type: MessageType, text: &str) -> Self {
        let text = text.split('\0').next().unwrap_or_default();
        let mut buf = BytesMut::with_capacity(text.len() + 1);
        buf.put_slice(text.as_bytes());
        buf.put_u8(0);
        Self::from_parts(message_type, buf.freeze())
    }

    // =========================================================================
    // Typed constructors
    // =========================================================================

    /// BOOL message, one byte (0 or 1)
    pub fn bool(value: bool) -> Self {
        Self::from_parts(MessageType::Bool, vec![value as u8])
    }

    /// STRING message, NUL-terminated
    pub fn string(text: &str) -> Self {
        Self::text(MessageType::String, text)
    }

    /// INT message, 4 bytes in native order
    pub fn int(value: i32) -> Self {
        Self::from_parts(MessageType::Int, value.to_ne_bytes().to_vec())
    }

    /// FLOAT message, 4 bytes in native order
    pub fn float(value: f32) -> Self {
        Self::from_parts(MessageType::Float, value.to_ne_bytes().to_vec())
    }

    /// DOUBLE message, 8 bytes in native order
    pub fn double(value: f64) -> Self {
        Self::from_parts(MessageType::Double, value.to_ne_bytes().to_vec())
    }

    /// BYTE message
    pub fn byte(value: u8) -> Self {
        Self::from_parts(MessageType::Byte, vec![value])
    }

    /// JSON message from already-encoded JSON text
    pub fn json(text: &str) -> Self {
        Self::text(MessageType::Json, text)
    }

    /// JSON message from any serializable value
    pub fn json_value<T: Serialize>(value: &T) -> Result<Self> {
        let text = serde_json::to_string(value)?;
        Ok(Self::json(&text))
    }

    /// STREAM message, NUL-terminated
    pub fn stream(text: &str) -> Self {
        Self::text(MessageType::Stream, text)
    }

    /// ESP_COMMAND message carrying a 3-byte pin command
    pub fn esp_command(command: Command) -> Self {
        Self::from_parts(MessageType::EspCommand, command.to_bytes().to_vec())
    }

    /// APPROVAL_SIGNAL, no payload
    pub fn approval_signal() -> Self {
        Self::signal(MessageType::ApprovalSignal)
    }

    /// ERROR_SIGNAL carrying a fault description
    pub fn error_signal(description: &str) -> Self {
        Self::text(MessageType::ErrorSignal, description)
    }

    /// PING, no payload
    pub fn ping() -> Self {
        Self::signal(MessageType::Ping)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Payload length as written in the frame header
    pub fn length(&self) -> u64 {
        self.payload().len() as u64
    }

    /// Payload buffer, `None` when the message has no payload
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Payload bytes, empty when absent
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Take ownership of the payload buffer
    pub fn into_data(self) -> Option<Bytes> {
        self.data
    }

    /// Check the payload against the shape implied by the tag
    pub fn check_shape(&self) -> Result<()> {
        let len = self.payload().len();
        let ok = match self.message_type.payload_shape() {
            PayloadShape::Empty => len == 0,
            PayloadShape::Fixed(size) => len == size,
            PayloadShape::Text | PayloadShape::Opaque => true,
        };
        if ok {
            Ok(())
        } else {
            Err(PinwireError::Protocol(format!(
                "{} payload has unexpected length {}",
                self.message_type, len
            )))
        }
    }

    fn expect_type(&self, message_type: MessageType) -> Result<()> {
        if self.message_type != message_type {
            return Err(PinwireError::Protocol(format!(
                "expected {} message, got {}",
                message_type, self.message_type
            )));
        }
        self.check_shape()
    }

    fn fixed<const N: usize>(&self, message_type: MessageType) -> Result<[u8; N]> {
        self.expect_type(message_type)?;
        self.payload().try_into().map_err(|_| {
            PinwireError::Protocol(format!(
                "{} payload must be {} bytes, got {}",
                message_type,
                N,
                self.payload().len()
            ))
        })
    }

    pub fn as_bool(&self) -> Result<bool> {
        let [b] = self.fixed::<1>(MessageType::Bool)?;
        Ok(b != 0)
    }

    pub fn as_int(&self) -> Result<i32> {
        Ok(i32::from_ne_bytes(self.fixed(MessageType::Int)?))
    }

    pub fn as_float(&self) -> Result<f32> {
        Ok(f32::from_ne_bytes(self.fixed(MessageType::Float)?))
    }

    pub fn as_double(&self) -> Result<f64> {
        Ok(f64::from_ne_bytes(self.fixed(MessageType::Double)?))
    }

    pub fn as_byte(&self) -> Result<u8> {
        let [b] = self.fixed::<1>(MessageType::Byte)?;
        Ok(b)
    }

    pub fn as_command(&self) -> Result<Command> {
        if self.message_type != MessageType::EspCommand {
            return Err(PinwireError::Protocol(format!(
                "expected {} message, got {}",
                MessageType::EspCommand,
                self.message_type
            )));
        }
        Command::from_bytes(self.payload())
    }

    /// Text of a STRING/JSON/STREAM/ERROR_SIGNAL message
    ///
    /// A single trailing NUL is stripped; peers that omit the terminator
    /// are accepted as well.
    pub fn as_text(&self) -> Result<&str> {
        if self.message_type.payload_shape() != PayloadShape::Text {
            return Err(PinwireError::Protocol(format!(
                "{} message does not carry text",
                self.message_type
            )));
        }
        let bytes = self.payload();
        let bytes = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
        std::str::from_utf8(bytes)
            .map_err(|e| PinwireError::Protocol(format!("{} payload is not UTF-8: {}", self.message_type, e)))
    }

    /// Deserialize the text of a JSON message
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.message_type != MessageType::Json {
            return Err(PinwireError::Protocol(format!(
                "expected {} message, got {}",
                MessageType::Json,
                self.message_type
            )));
        }
        Ok(serde_json::from_str(self.as_text()?)?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.message_type, self.length())?;
        let shape_ok = self.check_shape().is_ok();
        match self.message_type {
            MessageType::Bool if shape_ok => write!(f, ": {}", self.payload()[0] != 0),
            MessageType::Int if shape_ok => write!(f, ": {}", self.as_int().unwrap_or_default()),
            MessageType::Float if shape_ok => write!(f, ": {}", self.as_float().unwrap_or_default()),
            MessageType::Double if shape_ok => write!(f, ": {}", self.as_double().unwrap_or_default()),
            MessageType::Byte if shape_ok => write!(f, ": 0x{:02x}", self.payload()[0]),
            MessageType::EspCommand => match self.as_command() {
                Ok(c) if c.is_output => write!(f, ": pin {} [OUTPUT] -> {:?}", c.pin, c.level()),
                Ok(c) => write!(f, ": pin {} [INPUT]", c.pin),
                Err(_) => Ok(()),
            },
            _ => match self.as_text() {
                Ok(text) => write!(f, ": {:?}", text),
                Err(_) => Ok(()),
            },
        }
    }
}
