//! TouchCapture: native touch events in, one relay message out per event.
//!
//! Each native lifecycle event (start, move, end, cancel) carries the full
//! current contact set.  It is translated through the surface's coordinate
//! mode and sent immediately, exactly once.  A cancel is sent like any other
//! phase, usually with no touches, so displays drop their markers.

use std::sync::atomic::AtomicBool;

use tracing::{debug, trace};

use relay_core::{NativeTouchEvent, OutboundMessage, TouchTranslator, ViewportSize};

use super::outbound::{Outbound, SendOutcome};
use crate::infrastructure::input_source::{pump, CaptureError, InputSource};

/// Counters kept by a [`TouchCapture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub events: u64,
    pub queued: u64,
    /// Events that arrived while the connection was not open.
    pub skipped: u64,
}

pub struct TouchCapture<O: Outbound> {
    translator: TouchTranslator,
    outbound: O,
    stats: CaptureStats,
}

impl<O: Outbound> TouchCapture<O> {
    pub fn new(translator: TouchTranslator, outbound: O) -> Self {
        Self {
            translator,
            outbound,
            stats: CaptureStats::default(),
        }
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.translator.set_viewport(viewport);
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Translates and sends one native event.
    pub fn handle(&mut self, event: &NativeTouchEvent) -> SendOutcome {
        let message = self.translator.translate(event);
        let kind = message.ev.as_str();
        let touches = message.touches.len();
        let outcome = self.outbound.send(&OutboundMessage::Touch(message));

        self.stats.events += 1;
        match outcome {
            SendOutcome::Queued => {
                self.stats.queued += 1;
                trace!(kind, touches, "touch event queued");
            }
            SendOutcome::NotOpen(state) => {
                self.stats.skipped += 1;
                debug!(kind, %state, "touch event not sent: connection not open");
            }
            SendOutcome::EncodeFailed => {
                self.stats.skipped += 1;
            }
        }
        outcome
    }

    /// Pumps `source` until `running` is cleared or the source ends.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] if the source cannot be started.
    pub fn run<S>(&mut self, source: &S, running: &AtomicBool) -> Result<CaptureStats, CaptureError>
    where
        S: InputSource<NativeTouchEvent> + ?Sized,
    {
        pump(source, running, |event: NativeTouchEvent| {
            self.handle(&event);
        })?;
        Ok(self.stats)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
