//! Protocol Module
//!
//! Defines the wire protocol spoken between controller and device.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────────┬─────────────────────────────┐
//! │ Type (1) │  Length (8)  │           Payload           │
//! └──────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Message Types
//! - 0x00: BOOL            - 1 byte
//! - 0x01: STRING          - NUL-terminated text
//! - 0x02: INT             - i32, native order
//! - 0x03: FLOAT           - f32, native order
//! - 0x04: DOUBLE          - f64, native order
//! - 0x05: BYTE            - 1 byte
//! - 0x06: JSON            - NUL-terminated text
//! - 0x07: STREAM          - NUL-terminated text
//! - 0x08: ESP_COMMAND     - is_high (1) + is_output (1) + pin (1)
//! - 0x09: APPROVAL_SIGNAL - empty
//! - 0x0A: ERROR_SIGNAL    - NUL-terminated fault description
//! - 0x0B: PING            - empty

mod message_type;
mod command;
mod message;
mod codec;

pub use message_type::{MessageType, PayloadShape};
pub use command::{Command, COMMAND_SIZE};
pub use message::Message;
pub use codec::{
    decode_message, encode_message, read_header, read_message, read_payload, write_message,
    Header, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
