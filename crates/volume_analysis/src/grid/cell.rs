//! A single voxel sample cell.

use glam::DVec3;

use super::pool::{PointId, PointPool};
use crate::geometry::{BoxCorner, DAabb3};

/// Visibility mask value of a hidden cell.
pub const HIDDEN: u8 = 0;
/// Visibility mask value of a visible cell.
pub const VISIBLE: u8 = 1;

/// Voxel cell: 8 optional corner references and a visibility byte.
///
/// Corners may be missing (partially built or loaded cells); every derived
/// quantity only looks at the populated ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoxelCell {
  /// Corner references, indexed by [`BoxCorner::index`].
  pub corners: [Option<PointId>; 8],
  /// 0 = hidden, 1 = visible.
  pub visibility_mask: u8,
}

impl VoxelCell {
  #[inline]
  pub fn corner(&self, corner: BoxCorner) -> Option<PointId> {
    self.corners[corner.index()]
  }

  #[inline]
  pub fn set_corner(&mut self, corner: BoxCorner, id: Option<PointId>) {
    self.corners[corner.index()] = id;
  }

  #[inline]
  pub fn is_visible(&self) -> bool {
    self.visibility_mask != HIDDEN
  }

  /// Set the cell visible. Returns true if it was hidden before.
  #[inline]
  pub fn mark_visible(&mut self) -> bool {
    let was_hidden = !self.is_visible();
    self.visibility_mask = VISIBLE;
    was_hidden
  }

  /// Populated corners resolved against the pool.
  pub fn corner_positions<'a>(
    &'a self,
    pool: &'a PointPool,
  ) -> impl Iterator<Item = (BoxCorner, DVec3)> + 'a {
    BoxCorner::ALL.into_iter().filter_map(move |corner| {
      self
        .corner(corner)
        .and_then(|id| pool.get(id))
        .map(|p| (corner, p))
    })
  }

  /// Number of corners that resolve to a pooled point.
  pub fn populated_corner_count(&self, pool: &PointPool) -> usize {
    self.corner_positions(pool).count()
  }

  /// Mean of the populated corners; zero when none are populated.
  pub fn center(&self, pool: &PointPool) -> DVec3 {
    let mut sum = DVec3::ZERO;
    let mut count = 0usize;
    for (_, p) in self.corner_positions(pool) {
      sum += p;
      count += 1;
    }
    if count == 0 {
      DVec3::ZERO
    } else {
      sum / count as f64
    }
  }

  /// Bounding box of the populated corners.
  pub fn aabb(&self, pool: &PointPool) -> DAabb3 {
    DAabb3::from_points(self.corner_positions(pool).map(|(_, p)| p))
  }
}
