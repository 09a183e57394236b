//! Sub-sampling refinement for cells the main pass left hidden.
//!
//! A hidden cell gets a second chance: its box is subdivided into a small
//! sub-grid, the full three-phase scan runs over that sub-grid with the same
//! probe policy, and the parent is promoted as soon as any sub-cell turns out
//! visible. Sub-grids are throwaway.

use tracing::debug;

use crate::draw::DebugStyle;
use crate::grid::{GridDims, VoxelGrid};
use crate::probe::SceneProbe;
use crate::scan::RowScanner;

/// Outcome of refining one worklist entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refinement {
  /// Already visible when reached; no work done.
  Skipped,
  /// A sub-cell was visible, the parent is now visible.
  Promoted,
  /// Every sub-cell stayed hidden.
  StillHidden,
}

impl Refinement {
  /// Whether this outcome consumed budget.
  #[inline]
  pub fn did_work(self) -> bool {
    !matches!(self, Refinement::Skipped)
  }
}

/// Refines single cells of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubSampler {
  /// Sub-grid counts per parent cell.
  pub sub_dims: GridDims,
  /// Draw each sub-cell box to the debug sink.
  pub draw_sub_cells: bool,
}

impl SubSampler {
  pub fn new(sub_dims: GridDims) -> Self {
    Self {
      sub_dims,
      draw_sub_cells: false,
    }
  }

  pub fn with_sub_cell_drawing(mut self, enabled: bool) -> Self {
    self.draw_sub_cells = enabled;
    self
  }

  /// Re-scan cell `index` at sub-cell resolution and promote it if any
  /// sub-cell is visible.
  ///
  /// A cell whose box cannot be subdivided (missing or degenerate corners)
  /// stays hidden.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "refine::cell"))]
  pub fn refine<P: SceneProbe + ?Sized>(
    &self,
    grid: &mut VoxelGrid,
    index: usize,
    scanner: &mut RowScanner<'_, P>,
  ) -> Refinement {
    if grid.is_visible(index) {
      return Refinement::Skipped;
    }

    let bounds = grid.cell_aabb(index);
    let mut sub_grid = match VoxelGrid::generate(&bounds, self.sub_dims) {
      Ok(sub_grid) => sub_grid,
      Err(err) => {
        debug!(cell = index, %err, "Cell cannot be sub-sampled");
        return Refinement::StillHidden;
      }
    };

    if self.draw_sub_cells {
      for sub_index in 0..sub_grid.len() {
        let aabb = sub_grid.cell_aabb(sub_index);
        scanner.debug().aabb(&aabb, DebugStyle::SubCell);
      }
    }

    scanner.scan_all(&mut sub_grid);

    if sub_grid.visible_count() > 0 {
      grid.mark_visible(index);
      Refinement::Promoted
    } else {
      Refinement::StillHidden
    }
  }
}

#[cfg(test)]
#[path = "refine_test.rs"]
mod refine_test;
