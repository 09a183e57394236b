//! The eight named corners of a voxel box.
//!
//! ```text
//!        TBL──────TBR            Z (Top)
//!        /│       /│            │
//!      TFL──────TFR│            │   Y (Right)
//!       │ BBL────┼─BBR          │  /
//!       │/       │/             │ /
//!      BFL──────BFR             └──────── X (Forward)
//! ```
//!
//! Forward is +X, Right is +Y, Top is +Z. The *Backward*, *Left* and
//! *Bottom* sides sit on the box minimum.

use glam::DVec3;

use super::DAabb3;

/// One of the 8 corners of an axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BoxCorner {
  BottomBackwardLeft = 0,
  BottomForwardLeft = 1,
  BottomBackwardRight = 2,
  BottomForwardRight = 3,
  TopBackwardLeft = 4,
  TopForwardLeft = 5,
  TopBackwardRight = 6,
  TopForwardRight = 7,
}

impl BoxCorner {
  /// All corners in storage order (bit 0 = +X, bit 1 = +Y, bit 2 = +Z).
  pub const ALL: [BoxCorner; 8] = [
    BoxCorner::BottomBackwardLeft,
    BoxCorner::BottomForwardLeft,
    BoxCorner::BottomBackwardRight,
    BoxCorner::BottomForwardRight,
    BoxCorner::TopBackwardLeft,
    BoxCorner::TopForwardLeft,
    BoxCorner::TopBackwardRight,
    BoxCorner::TopForwardRight,
  ];

  /// Storage slot of this corner in a cell's corner array.
  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// Corner for a storage slot.
  #[inline]
  pub fn from_index(index: usize) -> Option<Self> {
    Self::ALL.get(index).copied()
  }

  /// Unit offset of this corner from the box minimum, each component 0 or 1.
  #[inline]
  pub fn offset(self) -> [usize; 3] {
    let bits = self as usize;
    [bits & 1, (bits >> 1) & 1, (bits >> 2) & 1]
  }

  /// Position of this corner on a box.
  #[inline]
  pub fn on_box(self, aabb: &DAabb3) -> DVec3 {
    let [ox, oy, oz] = self.offset();
    DVec3::new(
      if ox == 1 { aabb.max.x } else { aabb.min.x },
      if oy == 1 { aabb.max.y } else { aabb.min.y },
      if oz == 1 { aabb.max.z } else { aabb.min.z },
    )
  }

  /// Stable name, used as the persisted key.
  pub fn name(self) -> &'static str {
    match self {
      BoxCorner::BottomBackwardLeft => "BottomBackwardLeft",
      BoxCorner::BottomForwardLeft => "BottomForwardLeft",
      BoxCorner::BottomBackwardRight => "BottomBackwardRight",
      BoxCorner::BottomForwardRight => "BottomForwardRight",
      BoxCorner::TopBackwardLeft => "TopBackwardLeft",
      BoxCorner::TopForwardLeft => "TopForwardLeft",
      BoxCorner::TopBackwardRight => "TopBackwardRight",
      BoxCorner::TopForwardRight => "TopForwardRight",
    }
  }

  /// Parse a persisted corner name.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|corner| corner.name() == name)
  }
}

impl std::fmt::Display for BoxCorner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_round_trip() {
    for (i, corner) in BoxCorner::ALL.into_iter().enumerate() {
      assert_eq!(corner.index(), i);
      assert_eq!(BoxCorner::from_index(i), Some(corner));
    }
    assert_eq!(BoxCorner::from_index(8), None);
  }

  #[test]
  fn test_names_are_unique_and_parse() {
    for corner in BoxCorner::ALL {
      assert_eq!(BoxCorner::from_name(corner.name()), Some(corner));
    }
    assert_eq!(BoxCorner::from_name("Middle"), None);
  }

  #[test]
  fn test_offsets_match_names() {
    let aabb = DAabb3::new(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(BoxCorner::BottomBackwardLeft.on_box(&aabb), DVec3::ZERO);
    assert_eq!(BoxCorner::TopForwardRight.on_box(&aabb), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(BoxCorner::BottomForwardLeft.on_box(&aabb), DVec3::new(1.0, 0.0, 0.0));
    assert_eq!(BoxCorner::TopBackwardLeft.on_box(&aabb), DVec3::new(0.0, 0.0, 3.0));
  }
}
