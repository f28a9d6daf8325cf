//! Position reconciler.
//!
//! Every [`PositionSet`] is a complete snapshot of what a display should
//! show.  Reconciliation is therefore a full replace: drop every marker that
//! is currently drawn, then draw one marker per entry.  No marker identity is
//! kept between snapshots, so a bad frame can never leave stale crosses
//! behind; the next good snapshot repaints from scratch.
//!
//! This redraws everything on every update.  For the handful of fingers a
//! touch surface reports that is cheap; see `benches/reconcile_bench.rs`.

use super::coords::{CoordinateMode, Point, ViewportSize};
use crate::protocol::messages::PositionSet;

/// Something markers can be drawn on.
pub trait MarkerSurface {
    /// Removes every marker, returning how many were removed.
    fn clear_markers(&mut self) -> usize;

    /// Draws one marker centred on `at` (pixels).
    fn add_marker(&mut self, at: Point);
}

/// In-memory marker surface.  Used by headless displays and in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLayer {
    markers: Vec<Point>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Point] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl MarkerSurface for MarkerLayer {
    fn clear_markers(&mut self) -> usize {
        let removed = self.markers.len();
        self.markers.clear();
        removed
    }

    fn add_marker(&mut self, at: Point) {
        self.markers.push(at);
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub removed: usize,
    pub rendered: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PositionReconciler {
    mode: CoordinateMode,
    viewport: ViewportSize,
}

impl PositionReconciler {
    pub fn new(mode: CoordinateMode, viewport: ViewportSize) -> Self {
        Self { mode, viewport }
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    /// Replaces everything on `surface` with the markers of `set`.
    pub fn reconcile<S: MarkerSurface + ?Sized>(&self, set: &PositionSet, surface: &mut S) -> ReconcileReport {
        let removed = surface.clear_markers();
        for p in &set.pos {
            surface.add_marker(self.mode.to_render(*p, self.viewport));
        }
        ReconcileReport {
            removed,
            rendered: set.pos.len(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
