//! DisplaySurface: position snapshots in, markers out.

use tracing::debug;

use relay_core::{MarkerSurface, PositionReconciler, PositionSet, ReconcileReport, ViewportSize};

/// Owns a marker surface and keeps it equal to the latest snapshot.
pub struct DisplaySurface<S: MarkerSurface> {
    reconciler: PositionReconciler,
    surface: S,
    applied: u64,
}

impl<S: MarkerSurface> DisplaySurface<S> {
    pub fn new(reconciler: PositionReconciler, surface: S) -> Self {
        Self {
            reconciler,
            surface,
            applied: 0,
        }
    }

    /// Replaces every marker with the positions of `set`.
    pub fn apply(&mut self, set: &PositionSet) -> ReconcileReport {
        let report = self.reconciler.reconcile(set, &mut self.surface);
        self.applied += 1;
        debug!(removed = report.removed, rendered = report.rendered, "position set applied");
        report
    }

    /// New render-area size; takes effect with the next snapshot.
    pub fn resize(&mut self, viewport: ViewportSize) {
        self.reconciler.set_viewport(viewport);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of snapshots applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{CoordinateMode, MarkerLayer, Point};

    fn display() -> DisplaySurface<MarkerLayer> {
        let vp = ViewportSize::new(800.0, 600.0).unwrap();
        DisplaySurface::new(PositionReconciler::new(CoordinateMode::Normalized, vp), MarkerLayer::new())
    }

    #[test]
    fn test_apply_renders_snapshot() {
        // Arrange
        let mut d = display();

        // Act
        let report = d.apply(&PositionSet::new(vec![Point::new(0.5, 0.25)]));

        // Assert
        assert_eq!(report.rendered, 1);
        assert_eq!(d.surface().markers(), &[Point::new(400.0, 150.0)]);
        assert_eq!(d.applied(), 1);
    }

    #[test]
    fn test_resize_applies_to_next_snapshot() {
        let mut d = display();
        let set = PositionSet::new(vec![Point::new(0.5, 0.5)]);
        d.apply(&set);

        d.resize(ViewportSize::new(200.0, 100.0).unwrap());
        d.apply(&set);

        assert_eq!(d.surface().markers(), &[Point::new(100.0, 50.0)]);
    }

    #[test]
    fn test_stale_markers_never_survive() {
        let mut d = display();
        d.apply(&PositionSet::new(vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)]));
        let report = d.apply(&PositionSet::new(vec![Point::new(0.9, 0.9)]));
        assert_eq!(report, ReconcileReport { removed: 2, rendered: 1 });
        assert_eq!(d.surface().len(), 1);
    }
}
