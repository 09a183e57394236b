//! Single-line segmented row scan.

use glam::DVec3;
use smallvec::SmallVec;

use super::{ScanAxis, ScanPolicy, ScanStats};
use crate::draw::{DebugDraw, DebugStyle};
use crate::grid::VoxelGrid;
use crate::probe::{SceneProbe, SegmentHit};

/// Runs row scans against a scene with a fixed policy.
pub struct RowScanner<'a, P: SceneProbe + ?Sized> {
  scene: &'a P,
  policy: &'a ScanPolicy,
  debug: &'a mut dyn DebugDraw,
  clear_style: DebugStyle,
  stats: ScanStats,
}

impl<'a, P: SceneProbe + ?Sized> RowScanner<'a, P> {
  pub fn new(scene: &'a P, policy: &'a ScanPolicy, debug: &'a mut dyn DebugDraw) -> Self {
    Self {
      scene,
      policy,
      debug,
      clear_style: DebugStyle::ClearRay,
      stats: ScanStats::default(),
    }
  }

  /// Style used for unobstructed probes (sub-sampling draws its own).
  pub fn with_clear_style(mut self, style: DebugStyle) -> Self {
    self.clear_style = style;
    self
  }

  #[inline]
  pub fn stats(&self) -> ScanStats {
    self.stats
  }

  #[inline]
  pub fn policy(&self) -> &ScanPolicy {
    self.policy
  }

  #[inline]
  pub fn debug(&mut self) -> &mut dyn DebugDraw {
    &mut *self.debug
  }

  /// Check that nothing overlaps a small sphere at `center`.
  ///
  /// Always true when the center test is disabled.
  pub fn is_center_free(&mut self, center: DVec3) -> bool {
    match self.policy.center_radius {
      None => true,
      Some(radius) => {
        self.stats.overlap_tests += 1;
        !self.scene.sphere_overlap(center, radius, &self.policy.query)
      }
    }
  }

  /// Scan one line of cells, given in order along the line.
  ///
  /// Consecutive centers are assumed evenly spaced; the spacing of the first
  /// pair converts hit distances into cell offsets.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "scan::row"))]
  pub fn scan_row(&mut self, grid: &mut VoxelGrid, row: &[usize]) {
    let count = row.len();
    if count == 0 {
      return;
    }

    let centers: SmallVec<[DVec3; 32]> = row.iter().map(|&i| grid.cell_center(i)).collect();
    if count == 1 {
      self.mark_if_free(grid, row[0], centers[0]);
      return;
    }

    let step_len = centers[0].distance(centers[1]);
    let reach = self.policy.cells_per_probe(step_len);
    let last = count - 1;

    let mut start = 0;
    while start < count {
      if start == last {
        // Zero-length probe: only the center test can reject it.
        self.mark_if_free(grid, row[start], centers[start]);
        break;
      }

      let target = start.saturating_add(reach).min(last);
      let (from, to) = (centers[start], centers[target]);
      let hit = self.scene.segment_probe(from, to, &self.policy.query);
      self.stats.segment_probes += 1;

      let end = match hit {
        SegmentHit::Clear => target,
        SegmentHit::Blocked { .. } => {
          let hit_distance = hit.fraction() * from.distance(to);
          let offset = if step_len > f64::EPSILON {
            (hit_distance / step_len).floor() as usize
          } else {
            0
          };
          start.saturating_add(offset).clamp(start, target)
        }
      };

      if self.policy.draw_rays {
        let style = if hit.is_clear() {
          self.clear_style
        } else {
          DebugStyle::BlockedRay
        };
        self.debug.line(from, to, style);
      }

      for i in start..=end {
        self.mark_if_free(grid, row[i], centers[i]);
      }
      start = end + 1;
    }
  }

  /// Run all three phases over the whole grid in one go.
  pub fn scan_all(&mut self, grid: &mut VoxelGrid) {
    let dims = grid.dims();
    for axis in ScanAxis::ALL {
      for line in 0..axis.line_count(dims) {
        let cells = axis.line_cells(dims, line);
        self.scan_row(grid, &cells);
      }
    }
  }

  fn mark_if_free(&mut self, grid: &mut VoxelGrid, index: usize, center: DVec3) {
    if grid.is_visible(index) {
      return;
    }
    if self.is_center_free(center) && grid.mark_visible(index) {
      self.stats.cells_marked += 1;
    }
  }
}

#[cfg(test)]
#[path = "row_test.rs"]
mod row_test;
