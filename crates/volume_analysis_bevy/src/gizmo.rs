//! Gizmo rendering of analysis debug primitives.

use bevy::color::palettes::css;
use bevy::prelude::*;
use volume_analysis::glam::DVec3;
use volume_analysis::{DAabb3, DebugDraw, DebugStyle};

use crate::probe::to_vec3;

/// Gizmo color for a debug style.
pub fn style_color(style: DebugStyle) -> Color {
  match style {
    DebugStyle::ClearRay => css::LIME.into(),
    DebugStyle::BlockedRay => css::ORANGE_RED.into(),
    DebugStyle::SubSampleRay => css::AQUA.into(),
    DebugStyle::VisibleCell => css::GREEN.into(),
    DebugStyle::HiddenCell => css::RED.into(),
    DebugStyle::VolumeBounds => css::YELLOW.into(),
    DebugStyle::SubCell => css::GRAY.into(),
  }
}

/// [`DebugDraw`] sink drawing into this frame's gizmos.
pub struct GizmoDebugDraw<'a, 'w, 's> {
  gizmos: &'a mut Gizmos<'w, 's>,
  point_radius: f32,
}

impl<'a, 'w, 's> GizmoDebugDraw<'a, 'w, 's> {
  pub fn new(gizmos: &'a mut Gizmos<'w, 's>, point_radius: f32) -> Self {
    Self {
      gizmos,
      point_radius,
    }
  }
}

impl DebugDraw for GizmoDebugDraw<'_, '_, '_> {
  fn line(&mut self, start: DVec3, end: DVec3, style: DebugStyle) {
    self.gizmos.line(to_vec3(start), to_vec3(end), style_color(style));
  }

  fn point(&mut self, position: DVec3, style: DebugStyle) {
    self.gizmos.sphere(
      Isometry3d::from_translation(to_vec3(position)),
      self.point_radius,
      style_color(style),
    );
  }

  fn aabb(&mut self, aabb: &DAabb3, style: DebugStyle) {
    let transform = Transform::from_translation(to_vec3(aabb.center())).with_scale(to_vec3(aabb.size()));
    self.gizmos.cuboid(transform, style_color(style));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ray_styles_are_distinguishable() {
    assert_ne!(style_color(DebugStyle::ClearRay), style_color(DebugStyle::BlockedRay));
    assert_ne!(style_color(DebugStyle::VisibleCell), style_color(DebugStyle::HiddenCell));
    assert_ne!(style_color(DebugStyle::ClearRay), style_color(DebugStyle::SubSampleRay));
  }
}
