//! Configuration for pinwire
//!
//! Centralized configuration with sensible defaults. Values are fixed at
//! load time; nothing here is negotiated over the wire.

use crate::error::{PinwireError, Result};
use crate::protocol::COMMAND_SIZE;

/// Main configuration shared by the device and controller sides
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Wireless network name. Association itself is done by the platform.
    pub ssid: Option<String>,

    /// Wireless network passphrase
    pub passphrase: Option<String>,

    /// Controller address the device connects to (host:port)
    pub server_addr: String,

    // -------------------------------------------------------------------------
    // KeepAlive Configuration
    // -------------------------------------------------------------------------
    /// Send PING messages while idle
    pub keepalive_enabled: bool,

    /// Minimum time between two PINGs (milliseconds)
    pub keepalive_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest payload accepted in an inbound frame header (bytes)
    pub max_payload_size: u64,

    /// Sleep between control loop ticks that found no work (milliseconds)
    pub poll_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Controller Configuration
    // -------------------------------------------------------------------------
    /// How long the controller waits for APPROVAL_SIGNAL/ERROR_SIGNAL (milliseconds)
    pub ack_timeout_ms: u64,

    /// Drop the device if no PING arrives within this window (milliseconds)
    pub expect_ping_within_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssid: None,
            passphrase: None,
            server_addr: "127.0.0.1:5555".to_string(),
            keepalive_enabled: true,
            keepalive_interval_ms: 5000,
            max_payload_size: 16 * 1024 * 1024, // 16 MB
            poll_interval_ms: 10,
            ack_timeout_ms: 15_000,
            expect_ping_within_ms: Some(10_000),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the values can drive a session
    pub fn validate(&self) -> Result<()> {
        if self.server_addr.is_empty() {
            return Err(PinwireError::Config("server address is empty".to_string()));
        }
        if self.keepalive_enabled && self.keepalive_interval_ms == 0 {
            return Err(PinwireError::Config(
                "keepalive interval must be non-zero when keepalive is enabled".to_string(),
            ));
        }
        if self.max_payload_size < COMMAND_SIZE as u64 {
            return Err(PinwireError::Config(format!(
                "max payload size {} cannot hold a command ({} bytes)",
                self.max_payload_size, COMMAND_SIZE
            )));
        }
        if self.ack_timeout_ms == 0 {
            return Err(PinwireError::Config("ack timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the wireless network credentials
    pub fn network(mut self, ssid: impl Into<String>, passphrase: impl Into<String>) -> Self {
        self.config.ssid = Some(ssid.into());
        self.config.passphrase = Some(passphrase.into());
        self
    }

    /// Set the controller address (host:port)
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Enable or disable keepalive PINGs
    pub fn keepalive_enabled(mut self, enabled: bool) -> Self {
        self.config.keepalive_enabled = enabled;
        self
    }

    /// Set the keepalive interval (in milliseconds)
    pub fn keepalive_interval_ms(mut self, ms: u64) -> Self {
        self.config.keepalive_interval_ms = ms;
        self
    }

    /// Set the maximum accepted payload size (in bytes)
    pub fn max_payload_size(mut self, size: u64) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the idle poll interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the acknowledgement timeout (in milliseconds)
    pub fn ack_timeout_ms(mut self, ms: u64) -> Self {
        self.config.ack_timeout_ms = ms;
        self
    }

    /// Set the liveness window for device PINGs (None disables the check)
    pub fn expect_ping_within_ms(mut self, ms: Option<u64>) -> Self {
        self.config.expect_ping_within_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
