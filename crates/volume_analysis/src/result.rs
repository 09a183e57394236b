//! Completed-run snapshot.

use crate::grid::VoxelGrid;

/// Grid snapshot and counts of a finished run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisResult {
  pub grid: VoxelGrid,
  pub visible_count: usize,
  pub hidden_count: usize,
}

impl AnalysisResult {
  /// Snapshot a grid, counting cells from their flags.
  pub fn from_grid(grid: VoxelGrid) -> Self {
    let visible_count = grid.visible_count();
    let hidden_count = grid.len() - visible_count;
    Self {
      grid,
      visible_count,
      hidden_count,
    }
  }

  #[inline]
  pub fn total(&self) -> usize {
    self.visible_count + self.hidden_count
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.total() == 0
  }

  /// Share of visible cells in percent; 0 for an empty result.
  pub fn visibility_percentage(&self) -> f64 {
    percentage(self.visible_count, self.hidden_count)
  }
}

/// `100 * visible / (visible + hidden)`, 0 when both are 0.
#[inline]
pub fn percentage(visible: usize, hidden: usize) -> f64 {
  let total = visible + hidden;
  if total == 0 {
    0.0
  } else {
    100.0 * visible as f64 / total as f64
  }
}
