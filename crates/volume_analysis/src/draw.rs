//! Debug draw sink.
//!
//! Purely observational: the analysis reports what it probes and what it
//! concludes, a renderer decides how (or whether) to show it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::DAabb3;

/// What a debug primitive represents. Renderers map these to colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugStyle {
  /// Main-pass probe that found no obstruction.
  ClearRay,
  /// Probe that hit something.
  BlockedRay,
  /// Sub-sampling probe that found no obstruction.
  SubSampleRay,
  /// Final center of a visible cell.
  VisibleCell,
  /// Final center of a hidden cell.
  HiddenCell,
  /// Analysed volume bounds.
  VolumeBounds,
  /// Sub-sampling cell wireframe.
  SubCell,
}

/// Side-effect sink for debug geometry.
pub trait DebugDraw {
  fn line(&mut self, start: DVec3, end: DVec3, style: DebugStyle);

  fn point(&mut self, position: DVec3, style: DebugStyle);

  fn aabb(&mut self, aabb: &DAabb3, style: DebugStyle);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDebugDraw;

impl DebugDraw for NoDebugDraw {
  fn line(&mut self, _start: DVec3, _end: DVec3, _style: DebugStyle) {}

  fn point(&mut self, _position: DVec3, _style: DebugStyle) {}

  fn aabb(&mut self, _aabb: &DAabb3, _style: DebugStyle) {}
}

/// One recorded debug primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebugPrimitive {
  Line { start: DVec3, end: DVec3, style: DebugStyle },
  Point { position: DVec3, style: DebugStyle },
  Aabb { aabb: DAabb3, style: DebugStyle },
}

impl DebugPrimitive {
  pub fn style(&self) -> DebugStyle {
    match self {
      DebugPrimitive::Line { style, .. }
      | DebugPrimitive::Point { style, .. }
      | DebugPrimitive::Aabb { style, .. } => *style,
    }
  }

  /// Send this primitive to another sink.
  pub fn replay(&self, sink: &mut dyn DebugDraw) {
    match *self {
      DebugPrimitive::Line { start, end, style } => sink.line(start, end, style),
      DebugPrimitive::Point { position, style } => sink.point(position, style),
      DebugPrimitive::Aabb { aabb, style } => sink.aabb(&aabb, style),
    }
  }
}

/// Sink that stores every primitive, for tests and offline inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingDebugDraw {
  pub primitives: Vec<DebugPrimitive>,
}

impl RecordingDebugDraw {
  /// Replay everything recorded so far, oldest first.
  pub fn replay(&self, sink: &mut dyn DebugDraw) {
    for primitive in &self.primitives {
      primitive.replay(sink);
    }
  }

  pub fn clear(&mut self) {
    self.primitives.clear();
  }

  /// Number of recorded primitives with the given style.
  pub fn count(&self, style: DebugStyle) -> usize {
    self.primitives.iter().filter(|p| p.style() == style).count()
  }
}

impl DebugDraw for RecordingDebugDraw {
  fn line(&mut self, start: DVec3, end: DVec3, style: DebugStyle) {
    self.primitives.push(DebugPrimitive::Line { start, end, style });
  }

  fn point(&mut self, position: DVec3, style: DebugStyle) {
    self.primitives.push(DebugPrimitive::Point { position, style });
  }

  fn aabb(&mut self, aabb: &DAabb3, style: DebugStyle) {
    self.primitives.push(DebugPrimitive::Aabb { aabb: *aabb, style });
  }
}

/// Which debug primitives a run emits (all off by default).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawSettings {
  /// Master switch.
  pub enabled: bool,
  /// Every segment probe.
  pub rays: bool,
  /// Final cell centers colored by visibility.
  pub points: bool,
  /// The analysed volume bounds at start.
  pub bounds: bool,
  /// Sub-sampling cell wireframes.
  pub sub_cells: bool,
}

impl DebugDrawSettings {
  /// Everything on.
  pub const ALL: Self = Self {
    enabled: true,
    rays: true,
    points: true,
    bounds: true,
    sub_cells: true,
  };

  #[inline]
  pub fn rays(&self) -> bool {
    self.enabled && self.rays
  }

  #[inline]
  pub fn points(&self) -> bool {
    self.enabled && self.points
  }

  #[inline]
  pub fn bounds(&self) -> bool {
    self.enabled && self.bounds
  }

  #[inline]
  pub fn sub_cells(&self) -> bool {
    self.enabled && self.sub_cells
  }
}
