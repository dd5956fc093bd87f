//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────────┬─────────────────────────────┐
//! │ Type (1) │  Length (8)  │       Payload (Length)      │
//! └──────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! The length is an unsigned 64-bit integer in machine byte order. There is
//! no marker, version or checksum: framing relies on the length alone, so
//! the only check applied is an upper bound on it.

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Message, MessageType};
use crate::error::{PinwireError, Result};

/// Header size: 1 byte type + 8 bytes length
pub const HEADER_SIZE: usize = 9;

/// Default maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u64 = 16 * 1024 * 1024;

/// A decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub message_type: MessageType,
    pub length: u64,
}

impl Header {
    /// Parse a header, rejecting lengths above `max_payload`
    pub fn parse(bytes: &[u8; HEADER_SIZE], max_payload: u64) -> Result<Self> {
        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[1..HEADER_SIZE]);
        let length = u64::from_ne_bytes(length);

        if length > max_payload {
            return Err(PinwireError::PayloadTooLarge {
                len: length,
                max: max_payload,
            });
        }

        Ok(Self {
            message_type: MessageType::from(bytes[0]),
            length,
        })
    }

    /// Payload length as a buffer size
    fn payload_len(&self) -> Result<usize> {
        usize::try_from(self.length).map_err(|_| PinwireError::PayloadTooLarge {
            len: self.length,
            max: usize::MAX as u64,
        })
    }
}

// =============================================================================
// Message Encoding/Decoding
// =============================================================================

/// Encode a message to bytes
///
/// Format: type (1) + length (8) + payload
pub fn encode_message(message: &Message) -> Bytes {
    let payload = message.payload();

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    frame.put_u8(message.message_type().tag());
    frame.put_u64_ne(message.length());
    frame.put_slice(payload);

    frame.freeze()
}

/// Decode a single message from the start of `bytes`
pub fn decode_message(bytes: &[u8], max_payload: u64) -> Result<Message> {
    if bytes.len() < HEADER_SIZE {
        return Err(PinwireError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = Header::parse(&header, max_payload)?;
    let payload_len = header.payload_len()?;

    let available = bytes.len() - HEADER_SIZE;
    if available < payload_len {
        return Err(PinwireError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            payload_len, available
        )));
    }

    let payload = Bytes::copy_from_slice(&bytes[HEADER_SIZE..HEADER_SIZE + payload_len]);
    Ok(Message::from_parts(header.message_type, payload))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a frame header from a stream
///
/// Blocks until all 9 header bytes have arrived
pub fn read_header<R: Read>(reader: &mut R, max_payload: u64) -> Result<Header> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;
    Header::parse(&header, max_payload)
}

/// Read the payload announced by `header`
///
/// Blocks until the whole payload has arrived
pub fn read_payload<R: Read>(reader: &mut R, header: Header) -> Result<Message> {
    let payload_len = header.payload_len()?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok(Message::from_parts(header.message_type, payload))
}

/// Read a complete message from a stream
pub fn read_message<R: Read>(reader: &mut R, max_payload: u64) -> Result<Message> {
    let header = read_header(reader, max_payload)?;
    read_payload(reader, header)
}

/// Write a message to a stream
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    let bytes = encode_message(message);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
