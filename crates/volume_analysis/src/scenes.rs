//! Simple analytic scenes for testing and debugging.
//!
//! These scenes implement deterministic intersection math that is easy to
//! verify by hand. Use them to exercise the scanner without an engine.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{closest_point_on_segment, DAabb3};
use crate::probe::{ActorId, ProbeChannel, ProbeQuery, SceneProbe, SegmentHit};

/// Scene with no geometry: every segment is clear, no sphere overlaps.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl SceneProbe for EmptyScene {
  fn segment_probe(&self, _start: DVec3, _end: DVec3, _query: &ProbeQuery) -> SegmentHit {
    SegmentHit::Clear
  }

  fn sphere_overlap(&self, _center: DVec3, _radius: f64, _query: &ProbeQuery) -> bool {
    false
  }
}

/// Probe with no attached scene. Runs driven with it abort.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedScene;

impl SceneProbe for DetachedScene {
  fn has_scene(&self) -> bool {
    false
  }

  fn segment_probe(&self, _start: DVec3, _end: DVec3, _query: &ProbeQuery) -> SegmentHit {
    SegmentHit::Clear
  }

  fn sphere_overlap(&self, _center: DVec3, _radius: f64, _query: &ProbeQuery) -> bool {
    false
  }
}

/// Analytic occluder geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccluderShape {
  /// Axis-aligned solid box.
  Box { min: DVec3, max: DVec3 },
  /// Solid sphere.
  Sphere { center: DVec3, radius: f64 },
}

impl OccluderShape {
  pub fn from_aabb(aabb: DAabb3) -> Self {
    OccluderShape::Box {
      min: aabb.min,
      max: aabb.max,
    }
  }

  /// Entry fraction of the segment into the shape, if it touches it.
  pub fn segment_entry(&self, start: DVec3, end: DVec3) -> Option<f64> {
    match *self {
      OccluderShape::Box { min, max } => DAabb3 { min, max }.segment_entry(start, end),
      OccluderShape::Sphere { center, radius } => {
        let closest = closest_point_on_segment(center, start, end);
        if closest.distance_squared(center) > radius * radius {
          return None;
        }
        if start.distance_squared(center) <= radius * radius {
          return Some(0.0);
        }

        // Smallest root of |start + t * d - center|^2 = radius^2
        let d = end - start;
        let m = start - center;
        let a = d.length_squared();
        if a <= f64::EPSILON {
          return None;
        }
        let b = m.dot(d);
        let c = m.length_squared() - radius * radius;
        let disc = (b * b - a * c).max(0.0);
        Some(((-b - disc.sqrt()) / a).clamp(0.0, 1.0))
      }
    }
  }

  /// Whether a sphere overlaps the shape (touching counts).
  pub fn overlaps_sphere(&self, center: DVec3, radius: f64) -> bool {
    match *self {
      OccluderShape::Box { min, max } => {
        let aabb = DAabb3 { min, max };
        aabb.closest_point(center).distance_squared(center) <= radius * radius
      }
      OccluderShape::Sphere {
        center: other,
        radius: other_radius,
      } => {
        let reach = radius + other_radius;
        center.distance_squared(other) <= reach * reach
      }
    }
  }
}

/// A solid object in an [`OccluderScene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occluder {
  pub shape: OccluderShape,
  pub actor: ActorId,
  /// Bitmask of channels this occluder blocks (bit n = channel n).
  pub channels: u32,
}

impl Occluder {
  /// Check whether this occluder takes part in a query.
  #[inline]
  pub fn blocks(&self, query: &ProbeQuery) -> bool {
    channel_bit(query.channel) & self.channels != 0 && !query.is_ignored(self.actor)
  }
}

#[inline]
fn channel_bit(channel: ProbeChannel) -> u32 {
  1u32.checked_shl(channel.0 as u32).unwrap_or(0)
}

/// Scene made of analytic boxes and spheres.
#[derive(Clone, Debug, Default)]
pub struct OccluderScene {
  occluders: Vec<Occluder>,
}

impl OccluderScene {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an occluder blocking every channel; actor ids are assigned in order.
  pub fn with_shape(mut self, shape: OccluderShape) -> Self {
    self.push(shape, u32::MAX);
    self
  }

  pub fn with_box(self, min: DVec3, max: DVec3) -> Self {
    self.with_shape(OccluderShape::Box { min, max })
  }

  pub fn with_sphere(self, center: DVec3, radius: f64) -> Self {
    self.with_shape(OccluderShape::Sphere { center, radius })
  }

  /// Add an occluder, returning its actor id.
  pub fn push(&mut self, shape: OccluderShape, channels: u32) -> ActorId {
    let actor = ActorId(self.occluders.len() as u64);
    self.occluders.push(Occluder {
      shape,
      actor,
      channels,
    });
    actor
  }

  pub fn occluders(&self) -> &[Occluder] {
    &self.occluders
  }

  pub fn len(&self) -> usize {
    self.occluders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.occluders.is_empty()
  }
}

impl SceneProbe for OccluderScene {
  fn segment_probe(&self, start: DVec3, end: DVec3, query: &ProbeQuery) -> SegmentHit {
    self
      .occluders
      .iter()
      .filter(|o| o.blocks(query))
      .filter_map(|o| o.shape.segment_entry(start, end).map(|t| (t, o.actor)))
      .min_by(|a, b| a.0.total_cmp(&b.0))
      .map_or(SegmentHit::Clear, |(fraction, actor)| SegmentHit::Blocked {
        fraction,
        actor: Some(actor),
      })
  }

  fn sphere_overlap(&self, center: DVec3, radius: f64, query: &ProbeQuery) -> bool {
    self
      .occluders
      .iter()
      .filter(|o| o.blocks(query))
      .any(|o| o.shape.overlaps_sphere(center, radius))
  }
}

#[cfg(test)]
#[path = "scenes_test.rs"]
mod scenes_test;
