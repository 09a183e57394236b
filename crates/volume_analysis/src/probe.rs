//! Scene probe interface.
//!
//! The analysis never intersects geometry itself. Engine bridges (Bevy/avian,
//! analytic test scenes) implement [`SceneProbe`] and the scanner decides
//! when and between which points to call it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Collision channel selector passed through to the probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeChannel(pub u8);

/// Opaque identity of a scene object (engine entity, occluder id, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

/// Per-run query parameters shared by every probe call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeQuery {
  /// Channel the probes run on.
  pub channel: ProbeChannel,
  /// Objects the probes pass through.
  pub ignored: SmallVec<[ActorId; 4]>,
}

impl ProbeQuery {
  pub fn new(channel: ProbeChannel) -> Self {
    Self {
      channel,
      ignored: SmallVec::new(),
    }
  }

  /// Add an object to the ignore set.
  pub fn ignoring(mut self, actor: ActorId) -> Self {
    if !self.ignored.contains(&actor) {
      self.ignored.push(actor);
    }
    self
  }

  #[inline]
  pub fn is_ignored(&self, actor: ActorId) -> bool {
    self.ignored.contains(&actor)
  }
}

/// Outcome of a segment probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentHit {
  /// Nothing blocks the segment.
  Clear,
  /// First blocking hit.
  Blocked {
    /// Normalized distance along the segment, in [0, 1].
    fraction: f64,
    /// The object that was hit, when the scene can tell.
    actor: Option<ActorId>,
  },
}

impl SegmentHit {
  #[inline]
  pub fn is_clear(&self) -> bool {
    matches!(self, SegmentHit::Clear)
  }

  /// Hit fraction clamped to [0, 1]; 1 for a clear segment.
  #[inline]
  pub fn fraction(&self) -> f64 {
    match self {
      SegmentHit::Clear => 1.0,
      SegmentHit::Blocked { fraction, .. } => fraction.clamp(0.0, 1.0),
    }
  }
}

/// Ray/shape intersection primitive against a 3D scene.
///
/// Calls are synchronous and expected to return promptly; the controller
/// time-slices around them, it cannot interrupt one.
pub trait SceneProbe {
  /// Whether a scene is attached. A detached probe aborts the run.
  fn has_scene(&self) -> bool {
    true
  }

  /// First obstruction on the segment `start -> end`.
  fn segment_probe(&self, start: glam::DVec3, end: glam::DVec3, query: &ProbeQuery) -> SegmentHit;

  /// Whether any obstruction overlaps the sphere.
  fn sphere_overlap(&self, center: glam::DVec3, radius: f64, query: &ProbeQuery) -> bool;
}

impl<T: SceneProbe + ?Sized> SceneProbe for &T {
  fn has_scene(&self) -> bool {
    (**self).has_scene()
  }

  fn segment_probe(&self, start: glam::DVec3, end: glam::DVec3, query: &ProbeQuery) -> SegmentHit {
    (**self).segment_probe(start, end, query)
  }

  fn sphere_overlap(&self, center: glam::DVec3, radius: f64, query: &ProbeQuery) -> bool {
    (**self).sphere_overlap(center, radius, query)
  }
}

/// Blanket impl for boxed trait objects.
impl SceneProbe for Box<dyn SceneProbe> {
  fn has_scene(&self) -> bool {
    (**self).has_scene()
  }

  fn segment_probe(&self, start: glam::DVec3, end: glam::DVec3, query: &ProbeQuery) -> SegmentHit {
    (**self).segment_probe(start, end, query)
  }

  fn sphere_overlap(&self, center: glam::DVec3, radius: f64, query: &ProbeQuery) -> bool {
    (**self).sphere_overlap(center, radius, query)
  }
}
