//! Shared corner point pool.
//!
//! Cells never own their corner positions. They hold [`PointId`]s into a
//! [`PointPool`], so adjacent cells that share a corner share one pooled
//! point: moving it moves the corner of every cell referencing it.

use glam::DVec3;

/// Index of a point inside a [`PointPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u32);

impl PointId {
  /// Get the raw pool index.
  #[inline]
  pub fn raw(self) -> usize {
    self.0 as usize
  }
}

/// Index-addressed storage for corner points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointPool {
  points: Vec<DVec3>,
}

impl PointPool {
  /// Most points a pool can address.
  pub const MAX_POINTS: usize = u32::MAX as usize;

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      points: Vec::with_capacity(capacity),
    }
  }

  /// Append a point, returning its id. `None` once the pool is full.
  pub fn push(&mut self, point: DVec3) -> Option<PointId> {
    let id = PointId(u32::try_from(self.points.len()).ok()?);
    self.points.push(point);
    Some(id)
  }

  /// Id of the point stored at `index`, if any.
  #[inline]
  pub fn id_at(&self, index: usize) -> Option<PointId> {
    if index >= self.points.len() {
      return None;
    }
    u32::try_from(index).ok().map(PointId)
  }

  /// Position of a pooled point.
  #[inline]
  pub fn get(&self, id: PointId) -> Option<DVec3> {
    self.points.get(id.raw()).copied()
  }

  /// Move a pooled point. Returns false for an unknown id.
  pub fn set(&mut self, id: PointId, point: DVec3) -> bool {
    match self.points.get_mut(id.raw()) {
      Some(slot) => {
        *slot = point;
        true
      }
      None => false,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.points.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }
}
