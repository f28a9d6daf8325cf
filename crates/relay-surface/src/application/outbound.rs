//! The seam between use cases and the relay connection.
//!
//! Use cases send through [`Outbound`] and receive through a stream of
//! [`ChannelEvent`]s.  The production implementation is
//! `infrastructure::transport::Connection`; tests use a recording fake.

use relay_core::{ConnectionState, OutboundMessage, StateChange};

/// What happened to one `send` call.
///
/// Sending is fire-and-forget: `Queued` means the frame is in the
/// connection's FIFO, not that the relay received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// The connection was not Open; nothing was queued.
    NotOpen(ConnectionState),
    /// The message could not be serialized; nothing was queued.
    EncodeFailed,
}

impl SendOutcome {
    pub fn is_queued(self) -> bool {
        self == SendOutcome::Queued
    }
}

/// Something messages can be sent through.
pub trait Outbound {
    fn send(&self, message: &OutboundMessage) -> SendOutcome;
}

/// Inbound side of a connection, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    StateChanged(StateChange),
    /// Text of one inbound frame, not yet decoded.
    Frame(String),
    /// A binary frame arrived; its length.
    BinaryFrame(usize),
}
