//! Connection indicator output for a headless surface.
//!
//! A graphical surface would repaint a status swatch.  The command-line
//! binary has no swatch, so [`TracingStatusSink`] writes each signal as a
//! structured log line and remembers the last one.

use tracing::{info, warn};

use relay_core::{IndicatorSignal, LogicalChannel, StatusSink};

/// Logs indicator signals for one surface.
#[derive(Debug)]
pub struct TracingStatusSink {
    channel: LogicalChannel,
    last: Option<IndicatorSignal>,
    shown: u64,
}

impl TracingStatusSink {
    pub fn new(channel: LogicalChannel) -> Self {
        Self {
            channel,
            last: None,
            shown: 0,
        }
    }

    /// The most recently shown signal.
    pub fn last(&self) -> Option<&IndicatorSignal> {
        self.last.as_ref()
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl StatusSink for TracingStatusSink {
    fn show(&mut self, signal: &IndicatorSignal) {
        if signal.fault {
            warn!(channel = %self.channel, state = %signal.state, color = %signal.color, "status indicator");
        } else {
            info!(channel = %self.channel, state = %signal.state, color = %signal.color, "status indicator");
        }
        self.last = Some(signal.clone());
        self.shown += 1;
    }
}
