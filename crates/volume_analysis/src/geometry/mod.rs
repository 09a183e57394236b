//! Geometry utilities: bounds, named box corners and segment helpers.

pub mod bounds;
pub mod corner;

pub use bounds::DAabb3;
pub use corner::BoxCorner;

use glam::DVec3;

/// Segments shorter than this collapse onto their start point.
pub const SEGMENT_EPSILON: f64 = 1e-4;

/// Compute the axis-aligned bounding box of a point set.
///
/// Empty input yields the invalid [`DAabb3::EMPTY`] box.
#[inline]
pub fn bounding_box_from_points(points: &[DVec3]) -> DAabb3 {
  DAabb3::from_points(points.iter().copied())
}

/// Closest point to `point` on the segment `start -> end`.
pub fn closest_point_on_segment(point: DVec3, start: DVec3, end: DVec3) -> DVec3 {
  let line = end - start;
  let length = line.length();
  if length < SEGMENT_EPSILON {
    return start;
  }

  let dir = line / length;
  let projected = (point - start).dot(dir).clamp(0.0, length);
  start + dir * projected
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_closest_point_projects_inside() {
    let p = closest_point_on_segment(
      DVec3::new(1.0, 5.0, 0.0),
      DVec3::ZERO,
      DVec3::new(4.0, 0.0, 0.0),
    );
    assert_eq!(p, DVec3::new(1.0, 0.0, 0.0));
  }

  #[test]
  fn test_closest_point_clamps_to_ends() {
    let start = DVec3::ZERO;
    let end = DVec3::new(0.0, 0.0, 2.0);
    assert_eq!(closest_point_on_segment(DVec3::new(0.0, 0.0, -3.0), start, end), start);
    assert_eq!(closest_point_on_segment(DVec3::new(1.0, 0.0, 9.0), start, end), end);
  }

  #[test]
  fn test_closest_point_on_degenerate_segment() {
    let start = DVec3::splat(3.0);
    assert_eq!(closest_point_on_segment(DVec3::ZERO, start, start), start);
  }

  #[test]
  fn test_bounding_box_from_points() {
    let aabb = bounding_box_from_points(&[DVec3::ZERO, DVec3::new(2.0, 2.0, 2.0)]);
    assert_eq!(aabb.min, DVec3::ZERO);
    assert_eq!(aabb.max, DVec3::splat(2.0));
    assert!(!bounding_box_from_points(&[]).is_valid());
  }
}
