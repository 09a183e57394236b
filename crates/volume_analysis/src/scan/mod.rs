//! Visibility scanner.
//!
//! Walks a [`VoxelGrid`](crate::grid::VoxelGrid) line by line along X, then
//! Y, then Z. Each line is covered with as few long segment probes as
//! possible: a probe runs from the first unresolved cell towards the farthest
//! cell within the trace limit, and on a hit the next probe restarts just past
//! the last cell reachable before the obstruction.
//!
//! ```text
//!   cells:  0     1     2  ┃  3     4     5
//!           ●─────●─────●──╋─→                probe 0 -> 5, blocked
//!           ✓     ✓     ✓  ┃                  mark 0..=2
//!                          ┃  ●─────●─────●   probe 3 -> 5, clear
//!                          ┃  ✓     ✓     ✓   mark 3..=5
//! ```
//!
//! Visibility is monotonic: the scanner only ever marks cells visible.

pub mod cursor;
pub mod row;

pub use cursor::{LineCells, ScanAxis, ScanCursor};
pub use row::RowScanner;

use glam::DVec3;

use crate::probe::ProbeQuery;

/// Smallest cell size used when deriving the automatic center radius.
pub const MIN_AUTO_CELL_SIZE: f64 = 0.001;

/// Automatic center radius as a fraction of the smallest cell size.
pub const AUTO_RADIUS_FACTOR: f64 = 0.25;

/// Probe policy shared by the main pass and sub-sampling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanPolicy {
  /// Channel and ignore set for every probe.
  pub query: ProbeQuery,
  /// Longest single segment probe; 0 = unbounded.
  pub max_trace_distance: f64,
  /// Sphere radius of the center-free test; `None` disables the test.
  pub center_radius: Option<f64>,
  /// Emit every segment probe to the debug sink.
  pub draw_rays: bool,
}

impl ScanPolicy {
  /// Center radius to use: the configured one, or 25% of the smallest cell
  /// size when the configured radius is not positive.
  pub fn resolve_center_radius(configured: f64, cell_size: DVec3) -> f64 {
    if configured > 0.0 {
      return configured;
    }
    AUTO_RADIUS_FACTOR * cell_size.min_element().max(MIN_AUTO_CELL_SIZE)
  }

  /// How many cells one probe may span on a line with `step_len` spacing.
  ///
  /// Always at least one neighbor, so every probe makes progress.
  pub fn cells_per_probe(&self, step_len: f64) -> usize {
    if self.max_trace_distance <= 0.0 || step_len <= f64::EPSILON {
      return usize::MAX;
    }
    let cells = (self.max_trace_distance / step_len + 1e-9).floor();
    if cells >= usize::MAX as f64 {
      usize::MAX
    } else {
      (cells as usize).max(1)
    }
  }
}

/// Counters accumulated by a [`RowScanner`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
  /// Segment probes issued.
  pub segment_probes: usize,
  /// Sphere overlap tests issued.
  pub overlap_tests: usize,
  /// Cells switched from hidden to visible.
  pub cells_marked: usize,
}

impl std::ops::AddAssign for ScanStats {
  fn add_assign(&mut self, rhs: Self) {
    self.segment_probes += rhs.segment_probes;
    self.overlap_tests += rhs.overlap_tests;
    self.cells_marked += rhs.cells_marked;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_configured_radius_wins() {
    assert_eq!(ScanPolicy::resolve_center_radius(3.0, DVec3::splat(100.0)), 3.0);
  }

  #[test]
  fn test_auto_radius_uses_smallest_cell() {
    let r = ScanPolicy::resolve_center_radius(0.0, DVec3::new(4.0, 2.0, 8.0));
    assert_eq!(r, 0.5);
  }

  #[test]
  fn test_auto_radius_has_a_floor() {
    let r = ScanPolicy::resolve_center_radius(-1.0, DVec3::new(4.0, 0.0, 8.0));
    assert_eq!(r, AUTO_RADIUS_FACTOR * MIN_AUTO_CELL_SIZE);
  }

  #[test]
  fn test_cells_per_probe() {
    let unbounded = ScanPolicy::default();
    assert_eq!(unbounded.cells_per_probe(1.0), usize::MAX);

    let bounded = ScanPolicy {
      max_trace_distance: 3.5,
      ..Default::default()
    };
    assert_eq!(bounded.cells_per_probe(1.0), 3);
    assert_eq!(bounded.cells_per_probe(0.5), 7);
    // Shorter than one step still reaches the neighbor.
    assert_eq!(bounded.cells_per_probe(10.0), 1);
  }
}
