//! # pinwire
//!
//! Remote pin control for small devices over a persistent stream connection:
//! - Compact self-describing binary messages (type + length + payload)
//! - Pin commands dispatched to a GPIO-like driver
//! - Every inbound message acknowledged with APPROVAL_SIGNAL or ERROR_SIGNAL
//! - Keepalive PINGs while idle
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Controller (DeviceLink)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TCP
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Device Session                           │
//! │             (single-threaded control loop)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  KeepAlive  │          │ Dispatcher  │
//!   │   (PING)    │          │ (per frame) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ PinActuator │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod pin;
pub mod transport;
pub mod device;
pub mod controller;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PinwireError, Result};
pub use config::Config;
pub use device::Session;
pub use protocol::{Command, Message, MessageType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pinwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
