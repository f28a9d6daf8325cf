//! Connection lifecycle of a single relay channel.
//!
//! A connection starts in [`ConnectionState::Connecting`], may become
//! [`ConnectionState::Open`], and always ends in exactly one of the two closed
//! states.  Closed is terminal: a closed connection is never reopened, the
//! surface creates a new one instead.
//!
//! ```text
//!             ┌──────────► ClosedClean
//! Connecting ─┼──► Open ─┬─► ClosedClean
//!             └──────────┴─► ClosedUnclean
//! ```
//!
//! An *unclean* close (no close handshake: network drop, server crash, refused
//! connection) is kept distinct from a clean one so the status indicator can
//! show the user that something went wrong.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle state of a relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// The socket is being established.
    Connecting,
    /// The channel is established; frames may be sent.
    Open,
    /// Closed after a completed close handshake.
    ClosedClean,
    /// Closed without a close handshake (transport or server fault).
    ClosedUnclean,
}

impl ConnectionState {
    /// Returns the closed state matching a close event's `was_clean` flag.
    pub fn closed(was_clean: bool) -> Self {
        if was_clean {
            ConnectionState::ClosedClean
        } else {
            ConnectionState::ClosedUnclean
        }
    }

    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    pub fn is_closed(self) -> bool {
        matches!(self, ConnectionState::ClosedClean | ConnectionState::ClosedUnclean)
    }

    /// Returns `true` if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Open)
                | (Connecting, ClosedClean)
                | (Connecting, ClosedUnclean)
                | (Open, ClosedClean)
                | (Open, ClosedUnclean)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::ClosedClean => "closed (clean)",
            ConnectionState::ClosedUnclean => "closed (unclean)",
        };
        f.write_str(s)
    }
}

/// One observed lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub previous: ConnectionState,
    pub current: ConnectionState,
    /// Human-readable cause, e.g. the transport error behind an unclean close.
    pub reason: Option<String>,
}

impl StateChange {
    /// For a close transition, whether it was clean.  `None` otherwise.
    pub fn was_clean(&self) -> Option<bool> {
        match self.current {
            ConnectionState::ClosedClean => Some(true),
            ConnectionState::ClosedUnclean => Some(false),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_closed()
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal connection transition: {from} -> {to}")]
pub struct LifecycleError {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// Enforces the transition table above.
///
/// The transport task owns one of these per socket and only publishes changes
/// the lifecycle accepts.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
}

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Moves to `next`, returning the change to publish.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the transition is not allowed; the state
    /// is left unchanged.
    pub fn advance(
        &mut self,
        next: ConnectionState,
        reason: Option<String>,
    ) -> Result<StateChange, LifecycleError> {
        if !self.state.can_transition_to(next) {
            return Err(LifecycleError {
                from: self.state,
                to: next,
            });
        }
        let previous = self.state;
        self.state = next;
        Ok(StateChange {
            previous,
            current: next,
            reason,
        })
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
