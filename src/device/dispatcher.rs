//! Dispatcher
//!
//! Receive-and-react state machine for inbound messages.
//!
//! ```text
//! Idle ──► HeaderRead ──► PayloadRead ──► Dispatched ──► Replied ──► Idle
//! ```
//!
//! A cycle is fully synchronous: the next header is not read until the
//! current message has been dispatched and acknowledged.

use super::send_message;
use crate::error::Result;
use crate::pin::{PinActuator, PinMode};
use crate::protocol::{read_header, read_payload, Command, Message, MessageType};
use crate::transport::Transport;

/// Where the dispatcher is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No message in flight
    Idle,
    /// Type and length consumed
    HeaderRead,
    /// Full message available
    PayloadRead,
    /// Handler ran, inbound buffer released
    Dispatched,
    /// Acknowledgement sent
    Replied,
}

/// What the handler did with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An ESP_COMMAND was executed
    Executed(Command),

    /// The type has no handler; acknowledged anyway
    Unhandled(MessageType),

    /// Execution failed; ERROR_SIGNAL sent with this description
    Fault(String),
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Type of the inbound message
    pub message_type: MessageType,

    /// Payload length of the inbound message
    pub length: u64,

    pub outcome: Outcome,

    /// Types of the messages sent during the cycle, in order
    pub sent: Vec<MessageType>,
}

/// Runs dispatch cycles against a transport and a pin actuator
#[derive(Debug)]
pub struct Dispatcher {
    state: CycleState,
    max_payload: u64,
    cycles: u64,
}

impl Dispatcher {
    pub fn new(max_payload: u64) -> Self {
        Self {
            state: CycleState::Idle,
            max_payload,
            cycles: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Number of cycles completed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle if the transport has bytes waiting
    pub fn poll<T, P>(&mut self, transport: &mut T, pins: &mut P) -> Result<Option<CycleReport>>
    where
        T: Transport,
        P: PinActuator,
    {
        if !transport.bytes_available()? {
            return Ok(None);
        }
        self.run_cycle(transport, pins).map(Some)
    }

    /// Read one message, dispatch it and send the replies
    ///
    /// Blocks until the whole frame has arrived. Only transport and framing
    /// errors are returned; execution faults are reported to the peer.
    pub fn run_cycle<T, P>(&mut self, transport: &mut T, pins: &mut P) -> Result<CycleReport>
    where
        T: Transport,
        P: PinActuator,
    {
        let result = self.cycle(transport, pins);
        self.state = CycleState::Idle;
        result
    }

    fn cycle<T, P>(&mut self, transport: &mut T, pins: &mut P) -> Result<CycleReport>
    where
        T: Transport,
        P: PinActuator,
    {
        let header = read_header(transport, self.max_payload)?;
        self.transition(CycleState::HeaderRead);

        let message = read_payload(transport, header)?;
        self.transition(CycleState::PayloadRead);

        let message_type = message.message_type();
        let length = message.length();
        tracing::trace!("Received {{ type: {}, length: {} }}", message_type, length);

        // The message is consumed here; its buffer is gone before any reply
        let handled = dispatch(message, pins);
        self.transition(CycleState::Dispatched);

        let mut sent = Vec::with_capacity(2);
        let outcome = match handled {
            Ok(Handled::Command { command, reply }) => {
                if let Some(reply) = reply {
                    send_message(transport, &reply)?;
                    sent.push(reply.message_type());
                }
                send_message(transport, &Message::approval_signal())?;
                sent.push(MessageType::ApprovalSignal);
                Outcome::Executed(command)
            }
            Ok(Handled::Ignored) => {
                send_message(transport, &Message::approval_signal())?;
                sent.push(MessageType::ApprovalSignal);
                Outcome::Unhandled(message_type)
            }
            Err(fault) => {
                let description = fault.to_string();
                tracing::warn!("Command failed: {}", description);
                send_message(transport, &Message::error_signal(&description))?;
                sent.push(MessageType::ErrorSignal);
                Outcome::Fault(description)
            }
        };
        self.transition(CycleState::Replied);
        self.cycles += 1;

        Ok(CycleReport {
            message_type,
            length,
            outcome,
            sent,
        })
    }

    fn transition(&mut self, next: CycleState) {
        tracing::trace!("Cycle state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

enum Handled {
    Command {
        command: Command,
        reply: Option<Message>,
    },
    Ignored,
}

fn dispatch<P: PinActuator>(message: Message, pins: &mut P) -> Result<Handled> {
    match message.message_type() {
        MessageType::EspCommand => {
            let command = message.as_command()?;
            let reply = execute_command(command, pins)?;
            Ok(Handled::Command { command, reply })
        }
        other => {
            tracing::info!("Message type not handled: {}", other);
            Ok(Handled::Ignored)
        }
    }
}

/// Apply a command to the pins
///
/// Output commands produce no reply. Input commands produce an INT message
/// carrying the sampled level (0 or 1).
pub fn execute_command<P: PinActuator>(command: Command, pins: &mut P) -> Result<Option<Message>> {
    let pin = command.pin;

    if command.is_output {
        let level = command.level();
        pins.set_mode(pin, PinMode::Output)?;
        pins.write(pin, level)?;
        tracing::info!("Executed command: pin {} [OUTPUT] -> {:?}", pin, level);
        Ok(None)
    } else {
        pins.set_mode(pin, PinMode::Input)?;
        let level = pins.read(pin)?;
        tracing::info!("Executed command: pin {} [INPUT] = {:?}", pin, level);
        Ok(Some(Message::int(level.as_int())))
    }
}
