//! Pin command definitions
//!
//! The fixed 3-byte payload of an ESP_COMMAND message.

use crate::error::{PinwireError, Result};
use crate::pin::Level;

/// Size of an encoded command: is_high (1) + is_output (1) + pin (1)
pub const COMMAND_SIZE: usize = 3;

/// A pin command from the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Level to drive when `is_output` is set
    pub is_high: bool,

    /// Drive the pin (true) or read it back (false)
    pub is_output: bool,

    /// Target pin number
    pub pin: u8,
}

impl Command {
    /// Drive `pin` to `level`
    pub fn write(pin: u8, level: Level) -> Self {
        Self {
            is_high: level.is_high(),
            is_output: true,
            pin,
        }
    }

    /// Configure `pin` as input and report its level
    pub fn read(pin: u8) -> Self {
        Self {
            is_high: false,
            is_output: false,
            pin,
        }
    }

    /// Level requested by an output command
    pub fn level(&self) -> Level {
        Level::from(self.is_high)
    }

    pub fn to_bytes(&self) -> [u8; COMMAND_SIZE] {
        [self.is_high as u8, self.is_output as u8, self.pin]
    }

    /// Decode a command payload. Any non-zero flag byte reads as true.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [is_high, is_output, pin] => Ok(Self {
                is_high: *is_high != 0,
                is_output: *is_output != 0,
                pin: *pin,
            }),
            _ => Err(PinwireError::Protocol(format!(
                "ESP_COMMAND payload must be {} bytes, got {}",
                COMMAND_SIZE,
                bytes.len()
            ))),
        }
    }
}
