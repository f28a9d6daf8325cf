//! Connection state indicator.
//!
//! Every surface shows the user whether its relay connection is alive.  The
//! indicator turns each [`StateChange`] into an [`IndicatorSignal`] (a
//! background colour plus a fault flag) and hands it to a [`StatusSink`],
//! which decides how to present it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::connection::{ConnectionState, StateChange};

/// What the indicator emits for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSignal {
    pub state: ConnectionState,
    /// Colour from the active [`StatusPalette`], e.g. `"#aaa"`.
    pub color: String,
    /// `true` only for an unclean closure.
    pub fault: bool,
}

/// Receives indicator signals.
pub trait StatusSink {
    fn show(&mut self, signal: &IndicatorSignal);
}

/// One colour per connection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPalette {
    pub connecting: String,
    pub open: String,
    pub closed_clean: String,
    pub closed_unclean: String,
}

impl StatusPalette {
    /// Palette of the touch panel: red while connecting, grey once open,
    /// dark red after an unclean close.
    pub fn touch_pad() -> Self {
        Self {
            connecting: "#e66".to_string(),
            open: "#aaa".to_string(),
            closed_clean: "#fff".to_string(),
            closed_unclean: "#c22".to_string(),
        }
    }

    /// Palette of the slider console: pale yellow while connecting, pale blue
    /// while open, white after a clean close.
    pub fn console() -> Self {
        Self {
            connecting: "#ffd".to_string(),
            open: "#ddf".to_string(),
            closed_clean: "#fff".to_string(),
            closed_unclean: "#e66".to_string(),
        }
    }

    pub fn color_for(&self, state: ConnectionState) -> &str {
        match state {
            ConnectionState::Connecting => &self.connecting,
            ConnectionState::Open => &self.open,
            ConnectionState::ClosedClean => &self.closed_clean,
            ConnectionState::ClosedUnclean => &self.closed_unclean,
        }
    }

    pub fn signal(&self, state: ConnectionState) -> IndicatorSignal {
        IndicatorSignal {
            state,
            color: self.color_for(state).to_string(),
            fault: state == ConnectionState::ClosedUnclean,
        }
    }
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self::touch_pad()
    }
}

/// Drives a [`StatusSink`] from connection lifecycle transitions.
pub struct ConnectionIndicator<S: StatusSink> {
    palette: StatusPalette,
    sink: S,
    state: ConnectionState,
}

impl<S: StatusSink> ConnectionIndicator<S> {
    /// Creates the indicator and immediately shows the Connecting signal,
    /// since every connection starts out connecting.
    pub fn new(palette: StatusPalette, mut sink: S) -> Self {
        let state = ConnectionState::Connecting;
        sink.show(&palette.signal(state));
        Self {
            palette,
            sink,
            state,
        }
    }

    /// Records a transition and shows the matching signal.
    pub fn observe(&mut self, change: &StateChange) -> IndicatorSignal {
        self.state = change.current;
        let signal = self.palette.signal(change.current);
        let reason = change.reason.as_deref().unwrap_or("-");
        if signal.fault {
            warn!(from = %change.previous, reason, "relay connection closed uncleanly");
        } else {
            info!(from = %change.previous, to = %change.current, "relay connection state changed");
        }
        self.sink.show(&signal);
        signal
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
