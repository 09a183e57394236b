//! AnalysisConfig - what to analyse and how to probe it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::budget::StepBudget;
use crate::draw::DebugDrawSettings;
use crate::grid::GridDims;
use crate::probe::{ActorId, ProbeChannel, ProbeQuery};

/// Center-occupancy test settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterTest {
  pub enabled: bool,
  /// Sphere radius; 0 or less picks 25% of the smallest cell size.
  pub radius: f64,
}

/// Configuration for one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
  /// Points whose bounding box is the analysed volume.
  pub volume_points: Vec<DVec3>,

  /// Main grid cell counts per axis.
  pub sample_counts: GridDims,

  /// Sub-grid cell counts per hidden cell.
  pub sub_sample_counts: GridDims,

  /// Collision channel for every probe.
  pub channel: ProbeChannel,

  /// Let probes pass through [`self_actor`](Self::self_actor).
  pub ignore_self: bool,

  /// Identity of the object running the analysis.
  pub self_actor: Option<ActorId>,

  /// Longest single segment probe (0 = unbounded).
  pub max_trace_distance: f64,

  /// Give hidden cells a second, finer pass.
  pub enable_sub_sampling: bool,

  pub center_test: CenterTest,

  /// Default per-step budget for drivers (0 = unlimited).
  pub rows_per_step: usize,

  pub debug: DebugDrawSettings,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      volume_points: Vec::new(),
      sample_counts: GridDims::splat(10),
      sub_sample_counts: GridDims::splat(3),
      channel: ProbeChannel::default(),
      ignore_self: true,
      self_actor: None,
      max_trace_distance: 0.0,
      enable_sub_sampling: true,
      center_test: CenterTest::default(),
      rows_per_step: StepBudget::DEFAULT.max_rows,
      debug: DebugDrawSettings::default(),
    }
  }
}

impl AnalysisConfig {
  /// Config over the box spanned by two opposite corners.
  pub fn from_corners(min: DVec3, max: DVec3) -> Self {
    Self {
      volume_points: vec![min, max],
      ..Default::default()
    }
  }

  pub fn with_points(mut self, points: impl IntoIterator<Item = DVec3>) -> Self {
    self.volume_points = points.into_iter().collect();
    self
  }

  pub fn with_sample_counts(mut self, dims: GridDims) -> Self {
    self.sample_counts = dims;
    self
  }

  pub fn with_sub_sample_counts(mut self, dims: GridDims) -> Self {
    self.sub_sample_counts = dims;
    self
  }

  pub fn with_channel(mut self, channel: ProbeChannel) -> Self {
    self.channel = channel;
    self
  }

  /// Exclude `actor` from every probe.
  pub fn with_self_actor(mut self, actor: ActorId) -> Self {
    self.self_actor = Some(actor);
    self.ignore_self = true;
    self
  }

  pub fn with_max_trace_distance(mut self, distance: f64) -> Self {
    self.max_trace_distance = distance;
    self
  }

  pub fn with_sub_sampling(mut self, enabled: bool) -> Self {
    self.enable_sub_sampling = enabled;
    self
  }

  /// Enable the center test (radius 0 = automatic).
  pub fn with_center_test(mut self, radius: f64) -> Self {
    self.center_test = CenterTest {
      enabled: true,
      radius,
    };
    self
  }

  pub fn with_rows_per_step(mut self, rows: usize) -> Self {
    self.rows_per_step = rows;
    self
  }

  pub fn with_debug(mut self, debug: DebugDrawSettings) -> Self {
    self.debug = debug;
    self
  }

  /// Step budget matching [`rows_per_step`](Self::rows_per_step).
  #[inline]
  pub fn step_budget(&self) -> StepBudget {
    StepBudget::rows(self.rows_per_step)
  }

  /// Query every probe of a run uses.
  pub fn probe_query(&self) -> ProbeQuery {
    let query = ProbeQuery::new(self.channel);
    match self.self_actor {
      Some(actor) if self.ignore_self => query.ignoring(actor),
      _ => query,
    }
  }
}
