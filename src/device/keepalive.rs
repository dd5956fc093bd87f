//! KeepAlive
//!
//! Periodic PING emission that keeps an idle connection from being dropped
//! by the controller.

use std::time::{Duration, Instant};

use super::send_message;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::Message;
use crate::transport::Transport;

/// PING timer, checked once per control loop tick
#[derive(Debug, Clone)]
pub struct KeepAlive {
    enabled: bool,
    interval: Duration,
    last_sent: Instant,
}

impl KeepAlive {
    /// The first PING becomes due one interval after `now`
    pub fn new(enabled: bool, interval: Duration, now: Instant) -> Self {
        Self {
            enabled,
            interval,
            last_sent: now,
        }
    }

    pub fn from_config(config: &Config, now: Instant) -> Self {
        Self::new(
            config.keepalive_enabled,
            Duration::from_millis(config.keepalive_interval_ms),
            now,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_sent(&self) -> Instant {
        self.last_sent
    }

    /// Strictly more than one interval has passed since the last PING
    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled && now.saturating_duration_since(self.last_sent) > self.interval
    }

    /// Send a PING if one is due and the transport is up
    ///
    /// Returns whether a PING was sent.
    pub fn tick<T: Transport>(&mut self, transport: &mut T, now: Instant) -> Result<bool> {
        if !self.is_due(now) || !transport.is_connected() {
            return Ok(false);
        }

        send_message(transport, &Message::ping())?;
        self.last_sent = now;
        Ok(true)
    }
}
