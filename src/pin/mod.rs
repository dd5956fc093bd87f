//! Pin Module
//!
//! The GPIO-like interface the dispatcher drives.
//!
//! ## Responsibilities
//! - Switch a pin between input and output
//! - Drive an output pin low or high
//! - Sample the level of an input pin
//!
//! Real hardware drivers implement [`PinActuator`]; [`SimulatedPins`] backs
//! the device when it runs on a host machine.

mod simulated;

pub use simulated::{SimulatedPins, DEFAULT_PIN_COUNT};

use thiserror::Error;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Integer value reported in INT replies (Low=0, High=1)
    pub fn as_int(self) -> i32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Failure raised while executing a pin operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinFault {
    #[error("pin {pin} does not exist (pin count {count})")]
    InvalidPin { pin: u8, count: usize },

    #[error("pin {0} is not configured as output")]
    NotOutput(u8),

    #[error("pin {0} is not configured as input")]
    NotInput(u8),

    #[error("pin driver failure: {0}")]
    Driver(String),
}

/// Physical (or simulated) pin driver
pub trait PinActuator {
    /// Configure the direction of a pin
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), PinFault>;

    /// Drive an output pin
    fn write(&mut self, pin: u8, level: Level) -> Result<(), PinFault>;

    /// Sample an input pin
    fn read(&mut self, pin: u8) -> Result<Level, PinFault>;
}

impl<P: PinActuator + ?Sized> PinActuator for &mut P {
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), PinFault> {
        (**self).set_mode(pin, mode)
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), PinFault> {
        (**self).write(pin, level)
    }

    fn read(&mut self, pin: u8) -> Result<Level, PinFault> {
        (**self).read(pin)
    }
}
