//! Codec Tests
//!
//! Tests for frame encoding/decoding over slices and streams.

use std::io::Cursor;

use pinwire::protocol::{
    decode_message, encode_message, read_header, read_message, read_payload, write_message,
    Command, Message, MessageType, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use pinwire::pin::Level;
use pinwire::PinwireError;

fn one_of_each() -> Vec<Message> {
    vec![
        Message::bool(true),
        Message::string("hello device"),
        Message::int(-42),
        Message::float(3.5),
        Message::double(-1.25e10),
        Message::byte(0xA5),
        Message::json(r#"{"pin":5}"#),
        Message::stream("chunk"),
        Message::esp_command(Command::write(5, Level::High)),
        Message::approval_signal(),
        Message::error_signal("pin 99 does not exist"),
        Message::ping(),
    ]
}

// =============================================================================
// Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_round_trip_every_type() {
    let messages = one_of_each();
    let types: Vec<MessageType> = messages.iter().map(|m| m.message_type()).collect();
    assert_eq!(types, MessageType::ALL.to_vec());

    for message in messages {
        let encoded = encode_message(&message);
        assert_eq!(encoded.len(), HEADER_SIZE + message.length() as usize);

        let decoded = decode_message(&encoded, MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(decoded.message_type(), message.message_type());
        assert_eq!(decoded.length(), message.length());
        assert_eq!(decoded.payload(), message.payload());
        assert_eq!(decoded, message);
    }
}

#[test]
fn test_decode_unknown_type_is_kept() {
    let message = Message::from_parts(MessageType::Unknown(0x2A), vec![1u8, 2, 3]);
    let encoded = encode_message(&message);
    let decoded = decode_message(&encoded, MAX_PAYLOAD_SIZE).unwrap();

    assert_eq!(decoded.message_type(), MessageType::Unknown(0x2A));
    assert_eq!(decoded.payload(), &[1, 2, 3]);
}

#[test]
fn test_decode_ignores_trailing_bytes() {
    let mut bytes = encode_message(&Message::byte(7)).to_vec();
    bytes.extend_from_slice(&encode_message(&Message::ping()));

    let decoded = decode_message(&bytes, MAX_PAYLOAD_SIZE).unwrap();
    assert_eq!(decoded, Message::byte(7));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let bytes = [0x08, 0x03, 0x00]; // Only 3 bytes, need 9
    let result = decode_message(&bytes, MAX_PAYLOAD_SIZE);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Incomplete header"));
}

#[test]
fn test_incomplete_payload() {
    let mut bytes = vec![MessageType::String.tag()];
    bytes.extend_from_slice(&10u64.to_ne_bytes());
    bytes.extend_from_slice(b"hey");

    let result = decode_message(&bytes, MAX_PAYLOAD_SIZE);
    assert!(result.unwrap_err().to_string().contains("Incomplete payload"));
}

#[test]
fn test_payload_too_large() {
    let mut bytes = vec![MessageType::Stream.tag()];
    bytes.extend_from_slice(&(1024u64).to_ne_bytes());

    let result = decode_message(&bytes, 512);
    assert!(matches!(
        result,
        Err(PinwireError::PayloadTooLarge { len: 1024, max: 512 })
    ));
}

#[test]
fn test_stream_rejects_huge_length_before_reading_payload() {
    // A header claiming u64::MAX bytes must fail without trying to allocate
    let mut bytes = vec![MessageType::Stream.tag()];
    bytes.extend_from_slice(&u64::MAX.to_ne_bytes());

    let mut cursor = Cursor::new(bytes);
    let result = read_message(&mut cursor, MAX_PAYLOAD_SIZE);
    assert!(matches!(result, Err(PinwireError::PayloadTooLarge { .. })));
    assert_eq!(cursor.position() as usize, HEADER_SIZE);
}

#[test]
fn test_stream_truncated_payload_is_eof() {
    let mut bytes = encode_message(&Message::string("truncated")).to_vec();
    bytes.truncate(bytes.len() - 2);

    let mut cursor = Cursor::new(bytes);
    let err = read_message(&mut cursor, MAX_PAYLOAD_SIZE).unwrap_err();
    assert!(err.is_disconnect());
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_message() {
    let message = Message::esp_command(Command::read(6));

    let mut buffer = Vec::new();
    write_message(&mut buffer, &message).unwrap();

    let mut cursor = Cursor::new(buffer);
    let decoded = read_message(&mut cursor, MAX_PAYLOAD_SIZE).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_stream_header_then_payload() {
    let message = Message::json(r#"{"ok":true}"#);

    let mut cursor = Cursor::new(encode_message(&message).to_vec());
    let header = read_header(&mut cursor, MAX_PAYLOAD_SIZE).unwrap();
    assert_eq!(header.message_type, MessageType::Json);
    assert_eq!(header.length, message.length());
    assert_eq!(cursor.position() as usize, HEADER_SIZE);

    let decoded = read_payload(&mut cursor, header).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_stream_multiple_messages() {
    let messages = one_of_each();

    let mut buffer = Vec::new();
    for message in &messages {
        write_message(&mut buffer, message).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &messages {
        let decoded = read_message(&mut cursor, MAX_PAYLOAD_SIZE).unwrap();
        assert_eq!(&decoded, expected);
    }
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_esp_command() {
    let encoded = encode_message(&Message::esp_command(Command::write(5, Level::High)));

    // Expected: [0x08][3 as u64, native order][is_high=1, is_output=1, pin=5]
    assert_eq!(encoded.len(), 12);
    assert_eq!(encoded[0], 0x08);
    assert_eq!(&encoded[1..9], &3u64.to_ne_bytes());
    assert_eq!(&encoded[9..12], &[0x01, 0x01, 0x05]);
}

#[test]
fn test_wire_format_signals_have_no_payload() {
    let approval = encode_message(&Message::approval_signal());
    assert_eq!(approval.len(), HEADER_SIZE);
    assert_eq!(approval[0], 0x09);
    assert_eq!(&approval[1..9], &[0u8; 8]);

    let ping = encode_message(&Message::ping());
    assert_eq!(&ping[..], &[0x0B, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_wire_format_string_includes_terminator() {
    let encoded = encode_message(&Message::string("hi"));

    // Expected: [0x01][3 as u64][h i \0]
    assert_eq!(encoded[0], 0x01);
    assert_eq!(&encoded[1..9], &3u64.to_ne_bytes());
    assert_eq!(&encoded[9..], b"hi\0");
}

#[test]
fn test_wire_format_int_native_order() {
    let encoded = encode_message(&Message::int(1));
    assert_eq!(encoded[0], 0x02);
    assert_eq!(&encoded[1..9], &4u64.to_ne_bytes());
    assert_eq!(&encoded[9..], &1i32.to_ne_bytes());
}
