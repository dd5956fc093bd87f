//! Device Module
//!
//! The device side of the protocol: a single-threaded cooperative loop that
//! alternates between the keepalive timer and the dispatcher.
//!
//! ## Architecture
//! - [`Session`] owns the transport, the pin actuator and both components
//! - [`Dispatcher`] runs one receive → dispatch → reply cycle at a time
//! - [`KeepAlive`] emits PING messages on its own cadence
//!
//! All outbound traffic goes through [`send_message`], which is only ever
//! called from the session's thread.

mod dispatcher;
mod keepalive;
mod session;

pub use dispatcher::{execute_command, CycleReport, CycleState, Dispatcher, Outcome};
pub use keepalive::KeepAlive;
pub use session::{Session, Tick};

use crate::error::{PinwireError, Result};
use crate::protocol::{write_message, Message, MessageType};
use crate::transport::Transport;

/// Serialize and send one message
///
/// Fails with `NotConnected` instead of writing to a dead connection.
pub fn send_message<T: Transport>(transport: &mut T, message: &Message) -> Result<()> {
    if !transport.is_connected() {
        tracing::warn!("Not connected, {} message not sent", message.message_type());
        return Err(PinwireError::NotConnected);
    }

    write_message(transport, message)?;

    match message.message_type() {
        MessageType::Ping | MessageType::ApprovalSignal => {
            tracing::debug!("SENT: {}", message.message_type());
        }
        MessageType::ErrorSignal => {
            tracing::debug!("SENT: {} ({})", message.message_type(), message.as_text().unwrap_or("?"));
        }
        other => {
            tracing::debug!("SENT: {{ type: {}, length: {} }}", other, message.length());
        }
    }
    Ok(())
}
