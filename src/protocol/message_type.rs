//! Message type tags
//!
//! Each tag fixes the shape of the payload that follows it.

use std::fmt;

/// Message types carried in the first byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Bool,
    String,
    Int,
    Float,
    Double,
    Byte,
    Json,
    Stream,
    EspCommand,
    ApprovalSignal,
    ErrorSignal,
    Ping,

    /// A tag outside 0..=11, kept so the frame can still be acknowledged
    Unknown(u8),
}

/// Expected payload shape for a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// No payload at all
    Empty,

    /// Exactly this many bytes
    Fixed(usize),

    /// NUL-terminated text, length includes the terminator
    Text,

    /// Anything goes
    Opaque,
}

impl MessageType {
    /// All known types, in tag order
    pub const ALL: [MessageType; 12] = [
        MessageType::Bool,
        MessageType::String,
        MessageType::Int,
        MessageType::Float,
        MessageType::Double,
        MessageType::Byte,
        MessageType::Json,
        MessageType::Stream,
        MessageType::EspCommand,
        MessageType::ApprovalSignal,
        MessageType::ErrorSignal,
        MessageType::Ping,
    ];

    /// Wire tag
    pub fn tag(self) -> u8 {
        match self {
            MessageType::Bool => 0,
            MessageType::String => 1,
            MessageType::Int => 2,
            MessageType::Float => 3,
            MessageType::Double => 4,
            MessageType::Byte => 5,
            MessageType::Json => 6,
            MessageType::Stream => 7,
            MessageType::EspCommand => 8,
            MessageType::ApprovalSignal => 9,
            MessageType::ErrorSignal => 10,
            MessageType::Ping => 11,
            MessageType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, MessageType::Unknown(_))
    }

    /// Payload shape implied by the tag
    pub fn payload_shape(self) -> PayloadShape {
        match self {
            MessageType::Bool | MessageType::Byte => PayloadShape::Fixed(1),
            MessageType::Int | MessageType::Float => PayloadShape::Fixed(4),
            MessageType::Double => PayloadShape::Fixed(8),
            MessageType::EspCommand => PayloadShape::Fixed(super::COMMAND_SIZE),
            MessageType::String
            | MessageType::Json
            | MessageType::Stream
            | MessageType::ErrorSignal => PayloadShape::Text,
            MessageType::ApprovalSignal | MessageType::Ping => PayloadShape::Empty,
            MessageType::Unknown(_) => PayloadShape::Opaque,
        }
    }
}

impl From<u8> for MessageType {
    fn from(tag: u8) -> Self {
        match tag {
            0 => MessageType::Bool,
            1 => MessageType::String,
            2 => MessageType::Int,
            3 => MessageType::Float,
            4 => MessageType::Double,
            5 => MessageType::Byte,
            6 => MessageType::Json,
            7 => MessageType::Stream,
            8 => MessageType::EspCommand,
            9 => MessageType::ApprovalSignal,
            10 => MessageType::ErrorSignal,
            11 => MessageType::Ping,
            other => MessageType::Unknown(other),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type.tag()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Bool => f.write_str("BOOL"),
            MessageType::String => f.write_str("STRING"),
            MessageType::Int => f.write_str("INT"),
            MessageType::Float => f.write_str("FLOAT"),
            MessageType::Double => f.write_str("DOUBLE"),
            MessageType::Byte => f.write_str("BYTE"),
            MessageType::Json => f.write_str("JSON"),
            MessageType::Stream => f.write_str("STREAM"),
            MessageType::EspCommand => f.write_str("ESP_COMMAND"),
            MessageType::ApprovalSignal => f.write_str("APPROVAL_SIGNAL"),
            MessageType::ErrorSignal => f.write_str("ERROR_SIGNAL"),
            MessageType::Ping => f.write_str("PING"),
            MessageType::Unknown(tag) => write!(f, "UNKNOWN(0x{:02x})", tag),
        }
    }
}
