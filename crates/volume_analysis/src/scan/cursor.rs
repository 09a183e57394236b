//! Scan phases and the resumable position inside them.
//!
//! ```text
//! phase 0 (X rows)    phase 1 (Y rows)    phase 2 (Z columns)
//! one line per (y,z)  one line per (x,z)  one line per (x,y)
//! ```

use smallvec::SmallVec;

use crate::grid::GridDims;

/// Cell indices of one scan line.
pub type LineCells = SmallVec<[usize; 32]>;

/// Axis a scan phase walks along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanAxis {
  X,
  Y,
  Z,
}

impl ScanAxis {
  /// Phases in execution order.
  pub const ALL: [ScanAxis; 3] = [ScanAxis::X, ScanAxis::Y, ScanAxis::Z];

  /// Phase number (0 = X rows, 1 = Y rows, 2 = Z columns).
  #[inline]
  pub fn phase(self) -> usize {
    match self {
      ScanAxis::X => 0,
      ScanAxis::Y => 1,
      ScanAxis::Z => 2,
    }
  }

  /// The phase after this one.
  #[inline]
  pub fn next(self) -> Option<Self> {
    match self {
      ScanAxis::X => Some(ScanAxis::Y),
      ScanAxis::Y => Some(ScanAxis::Z),
      ScanAxis::Z => None,
    }
  }

  /// Number of lines in this phase.
  pub fn line_count(self, dims: GridDims) -> usize {
    match self {
      ScanAxis::X => dims.y * dims.z,
      ScanAxis::Y => dims.x * dims.z,
      ScanAxis::Z => dims.x * dims.y,
    }
  }

  /// Number of cells on each line of this phase.
  pub fn line_len(self, dims: GridDims) -> usize {
    match self {
      ScanAxis::X => dims.x,
      ScanAxis::Y => dims.y,
      ScanAxis::Z => dims.z,
    }
  }

  /// Cell indices of `line`, ordered along the axis.
  pub fn line_cells(self, dims: GridDims, line: usize) -> LineCells {
    let len = self.line_len(dims);
    match self {
      ScanAxis::X => {
        let (y, z) = (line % dims.y, line / dims.y);
        (0..len).map(|x| dims.index(x, y, z)).collect()
      }
      ScanAxis::Y => {
        let (x, z) = (line % dims.x, line / dims.x);
        (0..len).map(|y| dims.index(x, y, z)).collect()
      }
      ScanAxis::Z => {
        let (x, y) = (line % dims.x, line / dims.x);
        (0..len).map(|z| dims.index(x, y, z)).collect()
      }
    }
  }
}

/// Resumable position of the main pass: current phase and line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanCursor {
  axis: ScanAxis,
  line: usize,
  finished: bool,
}

impl Default for ScanCursor {
  fn default() -> Self {
    Self::new()
  }
}

impl ScanCursor {
  /// Cursor at phase 0, line 0.
  pub const fn new() -> Self {
    Self {
      axis: ScanAxis::X,
      line: 0,
      finished: false,
    }
  }

  #[inline]
  pub fn axis(&self) -> ScanAxis {
    self.axis
  }

  #[inline]
  pub fn phase(&self) -> usize {
    self.axis.phase()
  }

  #[inline]
  pub fn line(&self) -> usize {
    self.line
  }

  #[inline]
  pub fn is_finished(&self) -> bool {
    self.finished
  }

  /// Cells of the line under the cursor, `None` once all phases are done.
  pub fn current(&self, dims: GridDims) -> Option<LineCells> {
    if self.finished || self.line >= self.axis.line_count(dims) {
      return None;
    }
    Some(self.axis.line_cells(dims, self.line))
  }

  /// Move to the next line, rolling over into the next phase.
  pub fn advance(&mut self, dims: GridDims) {
    if self.finished {
      return;
    }
    self.line += 1;
    while self.line >= self.axis.line_count(dims) {
      match self.axis.next() {
        Some(axis) => {
          self.axis = axis;
          self.line = 0;
        }
        None => {
          self.finished = true;
          return;
        }
      }
    }
  }

  /// Lines already scanned, out of the total over all phases.
  pub fn progress(&self, dims: GridDims) -> (usize, usize) {
    let total: usize = ScanAxis::ALL.iter().map(|a| a.line_count(dims)).sum();
    if self.finished {
      return (total, total);
    }
    let done: usize = ScanAxis::ALL
      .iter()
      .take_while(|a| **a != self.axis)
      .map(|a| a.line_count(dims))
      .sum();
    (done + self.line, total)
  }
}
