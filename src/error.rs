//! Error types for pinwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::pin::PinFault;

/// Result type alias using PinwireError
pub type Result<T> = std::result::Result<T, PinwireError>;

/// Unified error type for pinwire operations
#[derive(Debug, Error)]
pub enum PinwireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: u64, max: u64 },

    // -------------------------------------------------------------------------
    // Pin Errors
    // -------------------------------------------------------------------------
    #[error("Pin fault: {0}")]
    Pin(#[from] PinFault),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Not connected")]
    NotConnected,

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Device reported error: {0}")]
    Rejected(String),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PinwireError {
    /// True for errors that mean the peer went away
    pub fn is_disconnect(&self) -> bool {
        match self {
            PinwireError::NotConnected => true,
            PinwireError::Io(e) => is_disconnect_kind(e.kind()),
            _ => false,
        }
    }
}

/// I/O error kinds raised when the peer closed or dropped the connection
pub fn is_disconnect_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::NotConnected
    )
}
