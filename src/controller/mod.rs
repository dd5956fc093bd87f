//! Controller Module
//!
//! The peer a device connects to. It sends typed messages and pin commands
//! and waits for the device's acknowledgement of each one.

mod link;

pub use link::DeviceLink;
