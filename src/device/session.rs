//! Device session
//!
//! Explicit context for one connection: nothing here lives in globals.

use std::thread;
use std::time::{Duration, Instant};

use super::{CycleReport, Dispatcher, KeepAlive};
use crate::config::Config;
use crate::error::Result;
use crate::pin::PinActuator;
use crate::transport::Transport;

/// What one control loop tick did
#[derive(Debug, Default)]
pub struct Tick {
    /// A PING went out
    pub pinged: bool,

    /// The dispatch cycle that ran, if bytes were waiting
    pub cycle: Option<CycleReport>,
}

/// A device session over one transport
pub struct Session<T: Transport, P: PinActuator> {
    transport: T,
    pins: P,
    dispatcher: Dispatcher,
    keepalive: KeepAlive,
    poll_interval: Duration,
}

impl<T: Transport, P: PinActuator> Session<T, P> {
    pub fn new(transport: T, pins: P, config: &Config) -> Self {
        Self {
            transport,
            pins,
            dispatcher: Dispatcher::new(config.max_payload_size),
            keepalive: KeepAlive::from_config(config, Instant::now()),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Use a specific keepalive timer (tests drive it with synthetic instants)
    pub fn with_keepalive(mut self, keepalive: KeepAlive) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// One pass of the control loop: keepalive first, then at most one message
    pub fn tick(&mut self, now: Instant) -> Result<Tick> {
        let pinged = self.keepalive.tick(&mut self.transport, now)?;
        let cycle = self.dispatcher.poll(&mut self.transport, &mut self.pins)?;
        Ok(Tick { pinged, cycle })
    }

    /// Run until the connection goes away
    ///
    /// A clean disconnect ends the session with `Ok`; framing errors such as
    /// an oversized header end it with the error, since the stream can no
    /// longer be trusted.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Session started");

        while self.transport.is_connected() {
            match self.tick(Instant::now()) {
                Ok(tick) => {
                    if tick.cycle.is_none() {
                        thread::sleep(self.poll_interval);
                    }
                }
                Err(e) if e.is_disconnect() => {
                    tracing::debug!("Connection closed: {}", e);
                    break;
                }
                Err(e) => {
                    tracing::error!("Session aborted after {} cycles: {}", self.dispatcher.cycles(), e);
                    return Err(e);
                }
            }
        }

        tracing::info!("Session ended after {} cycles", self.dispatcher.cycles());
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn keepalive(&self) -> &KeepAlive {
        &self.keepalive
    }

    pub fn into_parts(self) -> (T, P) {
        (self.transport, self.pins)
    }
}
