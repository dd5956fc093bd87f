//! Simulated pin bank
//!
//! In-memory pins with shared state: clones of a [`SimulatedPins`] see the
//! same bank, so a host process or test can drive input levels and inspect
//! outputs while the session owns another handle.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Level, PinActuator, PinFault, PinMode};

/// Number of pins in a default bank (GPIO 0..=39)
pub const DEFAULT_PIN_COUNT: usize = 40;

#[derive(Debug, Clone, Copy, Default)]
struct PinState {
    mode: Option<PinMode>,
    /// Level driven by the device when output
    output: Level,
    /// Level applied from outside when input
    input: Level,
}

/// Shared, thread-safe simulated pin bank
#[derive(Debug, Clone)]
pub struct SimulatedPins {
    pins: Arc<Mutex<Vec<PinState>>>,
}

impl SimulatedPins {
    /// Create a bank of `count` unconfigured pins
    pub fn new(count: usize) -> Self {
        Self {
            pins: Arc::new(Mutex::new(vec![PinState::default(); count])),
        }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.lock().len()
    }

    /// Current direction of a pin, `None` if never configured
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.pins.lock().get(pin as usize).and_then(|p| p.mode)
    }

    /// Level the device last drove on a pin
    pub fn output_level(&self, pin: u8) -> Option<Level> {
        self.pins.lock().get(pin as usize).map(|p| p.output)
    }

    /// Apply an external level to a pin, seen by reads in input mode
    pub fn set_input_level(&self, pin: u8, level: Level) -> Result<(), PinFault> {
        let mut pins = self.pins.lock();
        let count = pins.len();
        let state = pins
            .get_mut(pin as usize)
            .ok_or(PinFault::InvalidPin { pin, count })?;
        state.input = level;
        Ok(())
    }

    fn with_pin<T>(
        &self,
        pin: u8,
        f: impl FnOnce(&mut PinState) -> Result<T, PinFault>,
    ) -> Result<T, PinFault> {
        let mut pins = self.pins.lock();
        let count = pins.len();
        match pins.get_mut(pin as usize) {
            Some(state) => f(state),
            None => Err(PinFault::InvalidPin { pin, count }),
        }
    }
}

impl Default for SimulatedPins {
    fn default() -> Self {
        Self::new(DEFAULT_PIN_COUNT)
    }
}

impl PinActuator for SimulatedPins {
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), PinFault> {
        self.with_pin(pin, |state| {
            state.mode = Some(mode);
            Ok(())
        })
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), PinFault> {
        self.with_pin(pin, |state| match state.mode {
            Some(PinMode::Output) => {
                state.output = level;
                Ok(())
            }
            _ => Err(PinFault::NotOutput(pin)),
        })
    }

    fn read(&mut self, pin: u8) -> Result<Level, PinFault> {
        self.with_pin(pin, |state| match state.mode {
            Some(PinMode::Input) => Ok(state.input),
            _ => Err(PinFault::NotInput(pin)),
        })
    }
}
