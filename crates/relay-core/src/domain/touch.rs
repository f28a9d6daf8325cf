//! Translation of native multi-touch events into wire messages.
//!
//! The host reports every touch lifecycle event together with the *full*
//! set of contacts currently on the surface (not just the ones that changed).
//! One native event maps to exactly one [`TouchEventMessage`]; nothing is
//! batched, debounced, or sent twice.

use serde::{Deserialize, Serialize};

use super::coords::{CoordinateMode, Point, ViewportSize};
use crate::protocol::messages::{TouchEventMessage, TouchPhase};

/// One finger on the surface, in pixels relative to the surface's top-left.
///
/// `id` is the host's contact identifier.  It only matters during capture and
/// is not sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl ContactPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A native touch lifecycle event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeTouchEvent {
    pub phase: TouchPhase,
    /// Contacts still on the surface, in host order.  Usually empty for
    /// `touchend` of the last finger and for `touchcancel`.
    #[serde(default)]
    pub contacts: Vec<ContactPoint>,
}

impl NativeTouchEvent {
    pub fn new(phase: TouchPhase, contacts: Vec<ContactPoint>) -> Self {
        Self { phase, contacts }
    }
}

/// Maps native events through the surface's coordinate mode.
#[derive(Debug, Clone, Copy)]
pub struct TouchTranslator {
    mode: CoordinateMode,
    viewport: ViewportSize,
}

impl TouchTranslator {
    pub fn new(mode: CoordinateMode, viewport: ViewportSize) -> Self {
        Self { mode, viewport }
    }

    /// The capture area changed size (e.g. window resize or rotation).
    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Builds the message for `event`, preserving contact order.
    pub fn translate(&self, event: &NativeTouchEvent) -> TouchEventMessage {
        TouchEventMessage {
            ev: event.phase,
            touches: event
                .contacts
                .iter()
                .map(|c| self.mode.to_wire(c.position(), self.viewport))
                .collect(),
        }
    }
}
