//! Voxel grid model.
//!
//! A grid is a flat list of [`VoxelCell`]s in Z-major order:
//!
//! ```text
//! index(x, y, z) = z * (count_y * count_x) + y * count_x + x
//! ```
//!
//! Corner points live in a shared [`PointPool`] laid out as a
//! `(count_x + 1) * (count_y + 1) * (count_z + 1)` lattice, so each interior
//! corner is referenced by up to 8 cells.

pub mod cell;
pub mod pool;

pub use cell::{VoxelCell, HIDDEN, VISIBLE};
pub use pool::{PointId, PointPool};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::geometry::{BoxCorner, DAabb3};

/// Per-axis cell counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
  pub x: usize,
  pub y: usize,
  pub z: usize,
}

impl GridDims {
  pub const fn new(x: usize, y: usize, z: usize) -> Self {
    Self { x, y, z }
  }

  pub const fn splat(n: usize) -> Self {
    Self { x: n, y: n, z: n }
  }

  /// Total number of cells, saturating at `usize::MAX`.
  #[inline]
  pub fn cell_count(&self) -> usize {
    self.checked_cell_count().unwrap_or(usize::MAX)
  }

  /// Total number of cells, `None` on overflow.
  #[inline]
  pub fn checked_cell_count(&self) -> Option<usize> {
    self.x.checked_mul(self.y)?.checked_mul(self.z)
  }

  /// Number of lattice points (corners) a grid of these dims needs.
  pub fn lattice_point_count(&self) -> Option<usize> {
    let x = self.x.checked_add(1)?;
    let y = self.y.checked_add(1)?;
    let z = self.z.checked_add(1)?;
    x.checked_mul(y)?.checked_mul(z)
  }

  /// Check that every axis has at least one cell.
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.x > 0 && self.y > 0 && self.z > 0
  }

  /// Flat index of a cell coordinate.
  #[inline]
  pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
    z * (self.y * self.x) + y * self.x + x
  }

  /// Cell coordinate of a flat index.
  #[inline]
  pub fn coord(&self, index: usize) -> [usize; 3] {
    let layer = self.y * self.x;
    let z = index / layer;
    let rem = index % layer;
    [rem % self.x, rem / self.x, z]
  }

  /// Check that a grid of these dims can be generated.
  pub fn validate(&self) -> Result<(), AnalysisError> {
    if !self.is_valid() {
      return Err(AnalysisError::InvalidSampleCounts {
        x: self.x,
        y: self.y,
        z: self.z,
      });
    }
    match self.lattice_point_count() {
      Some(points) if points <= PointPool::MAX_POINTS => Ok(()),
      _ => Err(AnalysisError::TooManyCells {
        x: self.x,
        y: self.y,
        z: self.z,
      }),
    }
  }
}

/// Flat voxel grid with a shared corner pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxelGrid {
  dims: GridDims,
  cells: Vec<VoxelCell>,
  points: PointPool,
}

impl VoxelGrid {
  /// Subdivide `bounds` into `dims` equal cells.
  ///
  /// Cell `i` along an axis spans `[min + i * step, min + (i + 1) * step)`
  /// with `step = extent / count`. All cells start hidden with 8 corners.
  pub fn generate(bounds: &DAabb3, dims: GridDims) -> Result<Self, AnalysisError> {
    if !bounds.is_valid() {
      return Err(AnalysisError::InvalidBounds(*bounds));
    }
    dims.validate()?;
    let too_many = AnalysisError::TooManyCells {
      x: dims.x,
      y: dims.y,
      z: dims.z,
    };

    let step = bounds.size() / DVec3::new(dims.x as f64, dims.y as f64, dims.z as f64);
    let lattice = GridDims::new(dims.x + 1, dims.y + 1, dims.z + 1);

    let mut points = PointPool::with_capacity(lattice.cell_count());
    for k in 0..lattice.z {
      for j in 0..lattice.y {
        for i in 0..lattice.x {
          points
            .push(bounds.min + step * DVec3::new(i as f64, j as f64, k as f64))
            .ok_or_else(|| too_many.clone())?;
        }
      }
    }

    let mut cells = Vec::with_capacity(dims.cell_count());
    for z in 0..dims.z {
      for y in 0..dims.y {
        for x in 0..dims.x {
          let mut cell = VoxelCell::default();
          for corner in BoxCorner::ALL {
            let [ox, oy, oz] = corner.offset();
            let lattice_index = lattice.index(x + ox, y + oy, z + oz);
            cell.set_corner(corner, points.id_at(lattice_index));
          }
          cells.push(cell);
        }
      }
    }

    Ok(Self { dims, cells, points })
  }

  /// Assemble a grid from existing cells. `None` if the cell count does not
  /// match `dims`.
  pub fn from_parts(dims: GridDims, cells: Vec<VoxelCell>, points: PointPool) -> Option<Self> {
    (dims.checked_cell_count() == Some(cells.len())).then_some(Self { dims, cells, points })
  }

  #[inline]
  pub fn dims(&self) -> GridDims {
    self.dims
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  #[inline]
  pub fn cells(&self) -> &[VoxelCell] {
    &self.cells
  }

  #[inline]
  pub fn cell(&self, index: usize) -> Option<&VoxelCell> {
    self.cells.get(index)
  }

  #[inline]
  pub fn points(&self) -> &PointPool {
    &self.points
  }

  /// Move a shared corner point, affecting every cell that references it.
  pub fn move_point(&mut self, id: PointId, position: DVec3) -> bool {
    self.points.set(id, position)
  }

  /// Center of a cell (mean of its populated corners).
  #[inline]
  pub fn cell_center(&self, index: usize) -> DVec3 {
    self
      .cells
      .get(index)
      .map_or(DVec3::ZERO, |cell| cell.center(&self.points))
  }

  /// Bounding box of a cell's populated corners.
  #[inline]
  pub fn cell_aabb(&self, index: usize) -> DAabb3 {
    self
      .cells
      .get(index)
      .map_or(DAabb3::EMPTY, |cell| cell.aabb(&self.points))
  }

  #[inline]
  pub fn is_visible(&self, index: usize) -> bool {
    self.cells.get(index).is_some_and(VoxelCell::is_visible)
  }

  /// Mark a cell visible. Returns true if it was hidden before.
  ///
  /// Visibility only ever goes from hidden to visible during a run.
  #[inline]
  pub fn mark_visible(&mut self, index: usize) -> bool {
    self
      .cells
      .get_mut(index)
      .is_some_and(VoxelCell::mark_visible)
  }

  pub fn visible_count(&self) -> usize {
    self.cells.iter().filter(|c| c.is_visible()).count()
  }

  pub fn hidden_count(&self) -> usize {
    self.cells.len() - self.visible_count()
  }

  /// Indices of all hidden cells in grid order.
  pub fn hidden_indices(&self) -> Vec<usize> {
    self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, c)| !c.is_visible())
      .map(|(i, _)| i)
      .collect()
  }
}
