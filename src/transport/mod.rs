//! Transport Module
//!
//! The byte-stream connection between device and controller.
//!
//! ## Contract
//! - `read_exact` / `write_all` come from `std::io::Read` / `Write` and block
//! - `bytes_available` never blocks
//! - `is_connected` turns false once the peer is gone

mod tcp;

pub use tcp::TcpTransport;

use std::io::{Read, Write};

use crate::error::Result;

/// A connected byte stream
pub trait Transport: Read + Write {
    /// Whether the connection is still believed to be up
    fn is_connected(&self) -> bool;

    /// Whether at least one byte can be read without blocking
    fn bytes_available(&mut self) -> Result<bool>;
}
