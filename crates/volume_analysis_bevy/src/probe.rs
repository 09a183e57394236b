//! avian3d spatial queries as the analysis scene probe.

use avian3d::prelude::*;
use bevy::prelude::*;
use smallvec::SmallVec;
use volume_analysis::glam::DVec3;
use volume_analysis::{ActorId, ProbeChannel, ProbeQuery, SceneProbe, SegmentHit};

/// Convert a Bevy vector to the analysis' double-precision vector.
#[inline]
pub fn to_dvec3(v: Vec3) -> DVec3 {
  DVec3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Convert an analysis vector to a Bevy vector.
#[inline]
pub fn to_vec3(v: DVec3) -> Vec3 {
  Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

/// Actor identity of an entity.
#[inline]
pub fn actor_of(entity: Entity) -> ActorId {
  ActorId(entity.to_bits())
}

/// Entity behind an actor identity, if it encodes one.
#[inline]
pub fn entity_of(actor: ActorId) -> Option<Entity> {
  Entity::try_from_bits(actor.0).ok()
}

/// Collision layer mask for a probe channel (channel n = layer bit n).
#[inline]
pub fn channel_mask(channel: ProbeChannel) -> LayerMask {
  LayerMask(1u32.checked_shl(channel.0 as u32).unwrap_or(0))
}

/// Build the avian filter for a probe query.
pub fn query_filter(query: &ProbeQuery) -> SpatialQueryFilter {
  let excluded: SmallVec<[Entity; 4]> = query.ignored.iter().filter_map(|a| entity_of(*a)).collect();
  SpatialQueryFilter::from_mask(channel_mask(query.channel)).with_excluded_entities(excluded)
}

/// [`SceneProbe`] over the avian physics world of the current frame.
pub struct AvianSceneProbe<'a, 'w, 's> {
  spatial: &'a SpatialQuery<'w, 's>,
}

impl<'a, 'w, 's> AvianSceneProbe<'a, 'w, 's> {
  pub fn new(spatial: &'a SpatialQuery<'w, 's>) -> Self {
    Self { spatial }
  }
}

impl SceneProbe for AvianSceneProbe<'_, '_, '_> {
  fn segment_probe(&self, start: DVec3, end: DVec3, query: &ProbeQuery) -> SegmentHit {
    let origin = to_vec3(start);
    let delta = to_vec3(end) - origin;
    let length = delta.length();
    let Ok(direction) = Dir3::new(delta) else {
      return SegmentHit::Clear;
    };

    let filter = query_filter(query);
    match self.spatial.cast_ray(origin, direction, length, true, &filter) {
      Some(hit) => SegmentHit::Blocked {
        fraction: (hit.distance / length).clamp(0.0, 1.0) as f64,
        actor: Some(actor_of(hit.entity)),
      },
      None => SegmentHit::Clear,
    }
  }

  fn sphere_overlap(&self, center: DVec3, radius: f64, query: &ProbeQuery) -> bool {
    let filter = query_filter(query);
    let sphere = Collider::sphere(radius as f32);
    !self
      .spatial
      .shape_intersections(&sphere, to_vec3(center), Quat::IDENTITY, &filter)
      .is_empty()
  }
}
