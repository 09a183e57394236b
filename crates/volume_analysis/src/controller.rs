//! Run controller: lifecycle and time-sliced execution of an analysis.
//!
//! ```text
//!            start()                 main pass done,          worklist
//!   Idle ─────────────► MainScan ───── hidden cells ───► SubSampling ──┐
//!    ▲                     │           remain                          │
//!    │                     │ nothing hidden / sub-sampling off         │
//!    └──── finalize ◄──────┴───────────────────────────────────────────┘
//! ```
//!
//! `stop()` drops back to Idle without finalizing; `clear()` also forgets
//! the last result. A missing scene aborts the run at the next step.

use glam::DVec3;
use tracing::{debug, info, trace, warn};
use web_time::Instant;

use crate::budget::{StepBudget, StepStats};
use crate::config::AnalysisConfig;
use crate::draw::{DebugDraw, DebugStyle, NoDebugDraw};
use crate::error::AnalysisError;
use crate::geometry::{bounding_box_from_points, DAabb3};
use crate::grid::VoxelGrid;
use crate::metrics::{self, AnalysisMetrics};
use crate::probe::SceneProbe;
use crate::refine::{Refinement, SubSampler};
use crate::result::{percentage, AnalysisResult};
use crate::scan::{RowScanner, ScanCursor, ScanPolicy};

/// Where a run currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunPhase {
  /// No run in flight.
  #[default]
  Idle,
  /// Three-phase row scan over the main grid.
  MainScan,
  /// Refining cells the main pass left hidden.
  SubSampling,
}

/// What a call to [`VolumeAnalysis::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunStatus {
  /// Nothing to do.
  Idle,
  /// Budget exhausted, more work remains.
  Continuing,
  /// The run finished during this step.
  Completed,
  /// The run was abandoned during this step.
  Aborted,
}

impl RunStatus {
  #[inline]
  pub fn is_continuing(self) -> bool {
    self == RunStatus::Continuing
  }
}

/// Called once per completed run with the final result.
pub type CompletionCallback = Box<dyn FnMut(&AnalysisResult) + Send + Sync>;

/// Incremental visibility analysis over one volume.
pub struct VolumeAnalysis {
  config: AnalysisConfig,
  phase: RunPhase,

  bounds: DAabb3,
  cell_size: DVec3,
  grid: VoxelGrid,
  policy: ScanPolicy,
  sampler: SubSampler,

  cursor: ScanCursor,
  worklist: Vec<usize>,
  work_cursor: usize,
  bounds_drawn: bool,

  result: AnalysisResult,
  last_stats: StepStats,
  on_complete: Option<CompletionCallback>,

  metrics: AnalysisMetrics,
  run_started: Option<Instant>,
}

impl Default for VolumeAnalysis {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for VolumeAnalysis {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VolumeAnalysis")
      .field("phase", &self.phase)
      .field("dims", &self.grid.dims())
      .field("visible_count", &self.result.visible_count)
      .field("hidden_count", &self.result.hidden_count)
      .finish_non_exhaustive()
  }
}

impl VolumeAnalysis {
  pub fn new() -> Self {
    Self {
      config: AnalysisConfig::default(),
      phase: RunPhase::Idle,
      bounds: DAabb3::EMPTY,
      cell_size: DVec3::ZERO,
      grid: VoxelGrid::default(),
      policy: ScanPolicy::default(),
      sampler: SubSampler::new(AnalysisConfig::default().sub_sample_counts),
      cursor: ScanCursor::new(),
      worklist: Vec::new(),
      work_cursor: 0,
      bounds_drawn: false,
      result: AnalysisResult::default(),
      last_stats: StepStats::default(),
      on_complete: None,
      metrics: AnalysisMetrics::new(),
      run_started: None,
    }
  }

  /// Register the completion listener, replacing any previous one.
  pub fn set_on_complete<F>(&mut self, callback: F)
  where
    F: FnMut(&AnalysisResult) + Send + Sync + 'static,
  {
    self.on_complete = Some(Box::new(callback));
  }

  pub fn clear_on_complete(&mut self) {
    self.on_complete = None;
  }

  /// Begin a new run, discarding any run in flight and the last result.
  ///
  /// Fails without building a grid when fewer than two finite points are
  /// given, when they all coincide, or when a sample count is zero.
  pub fn start(&mut self, config: AnalysisConfig) -> Result<(), AnalysisError> {
    if self.is_running() {
      debug!("Volume analysis restarted; discarding run in flight");
    }
    self.clear();

    let (bounds, grid) = match Self::build_grid(&config) {
      Ok(built) => built,
      Err(err) => {
        warn!(%err, "Volume analysis not started");
        return Err(err);
      }
    };

    let dims = grid.dims();
    let cell_size = bounds.size() / DVec3::new(dims.x as f64, dims.y as f64, dims.z as f64);
    self.policy = ScanPolicy {
      query: config.probe_query(),
      max_trace_distance: config.max_trace_distance.max(0.0),
      center_radius: config
        .center_test
        .enabled
        .then(|| ScanPolicy::resolve_center_radius(config.center_test.radius, cell_size)),
      draw_rays: config.debug.rays(),
    };
    self.sampler = SubSampler::new(config.sub_sample_counts)
      .with_sub_cell_drawing(config.debug.sub_cells());

    info!(
      cells = grid.len(),
      x = dims.x,
      y = dims.y,
      z = dims.z,
      sub_sampling = config.enable_sub_sampling,
      "Volume analysis started"
    );

    self.bounds = bounds;
    self.cell_size = cell_size;
    self.grid = grid;
    self.config = config;
    self.cursor = ScanCursor::new();
    self.phase = RunPhase::MainScan;
    self.metrics.reset();
    self.run_started = Some(Instant::now());
    Ok(())
  }

  fn build_grid(config: &AnalysisConfig) -> Result<(DAabb3, VoxelGrid), AnalysisError> {
    let points: Vec<DVec3> = config
      .volume_points
      .iter()
      .copied()
      .filter(|p| p.is_finite())
      .collect();
    if points.len() < 2 {
      return Err(AnalysisError::InsufficientPoints {
        found: points.len(),
      });
    }
    if points.iter().all(|p| *p == points[0]) {
      return Err(AnalysisError::DegenerateBounds);
    }
    if config.enable_sub_sampling {
      config.sub_sample_counts.validate()?;
    }

    let bounds = bounding_box_from_points(&points);
    let grid = VoxelGrid::generate(&bounds, config.sample_counts)?;
    Ok((bounds, grid))
  }

  /// Abandon the run in flight. No completion is signalled.
  pub fn stop(&mut self) {
    if self.is_running() {
      debug!(phase = ?self.phase, "Volume analysis stopped");
      self.cursor = ScanCursor::new();
    }
    self.phase = RunPhase::Idle;
    self.worklist.clear();
    self.work_cursor = 0;
    self.run_started = None;
  }

  /// Stop and forget the grid and last result.
  pub fn clear(&mut self) {
    self.stop();
    self.grid = VoxelGrid::default();
    self.result = AnalysisResult::default();
    self.bounds = DAabb3::EMPTY;
    self.cell_size = DVec3::ZERO;
    self.cursor = ScanCursor::new();
    self.bounds_drawn = false;
    self.last_stats = StepStats::default();
  }

  /// Advance the run by at most `budget` units.
  #[inline]
  pub fn step<P: SceneProbe + ?Sized>(&mut self, scene: &P, budget: StepBudget) -> RunStatus {
    self.step_with_debug(scene, budget, &mut NoDebugDraw)
  }

  /// [`step`](Self::step) with a debug sink for rays, bounds and results.
  ///
  /// A main-pass unit is one scan line, a sub-sampling unit one refined cell.
  /// When the main pass ends mid-step the remaining budget carries over into
  /// sub-sampling.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "analysis::step"))]
  pub fn step_with_debug<P: SceneProbe + ?Sized>(
    &mut self,
    scene: &P,
    budget: StepBudget,
    debug: &mut dyn DebugDraw,
  ) -> RunStatus {
    self.last_stats = StepStats::default();
    if self.phase == RunPhase::Idle {
      return RunStatus::Idle;
    }
    if !scene.has_scene() {
      warn!(err = %AnalysisError::MissingScene, "Volume analysis aborted");
      self.stop();
      return RunStatus::Aborted;
    }

    let step_start = metrics::is_enabled().then(Instant::now);

    if !self.bounds_drawn {
      if self.config.debug.bounds() {
        debug.aabb(&self.bounds, DebugStyle::VolumeBounds);
      }
      self.bounds_drawn = true;
    }

    let policy = self.policy.clone();
    let mut stats = StepStats::default();

    if self.phase == RunPhase::MainScan {
      let mut scanner = RowScanner::new(scene, &policy, &mut *debug);
      self.advance_main_scan(&mut scanner, budget, &mut stats);
      stats.scan += scanner.stats();
    }

    if self.phase == RunPhase::SubSampling {
      let mut scanner =
        RowScanner::new(scene, &policy, &mut *debug).with_clear_style(DebugStyle::SubSampleRay);
      self.advance_sub_sampling(&mut scanner, budget, &mut stats);
      stats.scan += scanner.stats();
    }

    self.last_stats = stats;
    if let Some(start) = step_start {
      self
        .metrics
        .record_step(start.elapsed().as_micros() as u64, &stats);
    }

    if self.phase == RunPhase::Idle {
      self.finalize(debug);
      RunStatus::Completed
    } else {
      trace!(
        phase = ?self.phase,
        rows = stats.rows_scanned,
        refined = stats.cells_refined,
        probes = stats.scan.segment_probes,
        "Volume analysis step"
      );
      RunStatus::Continuing
    }
  }

  /// Step until the run is no longer continuing.
  pub fn run_to_end<P: SceneProbe + ?Sized>(
    &mut self,
    scene: &P,
    budget: StepBudget,
    debug: &mut dyn DebugDraw,
  ) -> RunStatus {
    loop {
      let status = self.step_with_debug(scene, budget, debug);
      if !status.is_continuing() {
        return status;
      }
    }
  }

  fn advance_main_scan<P: SceneProbe + ?Sized>(
    &mut self,
    scanner: &mut RowScanner<'_, P>,
    budget: StepBudget,
    stats: &mut StepStats,
  ) {
    let dims = self.grid.dims();
    while budget.allows(stats.units()) {
      let Some(cells) = self.cursor.current(dims) else {
        break;
      };
      scanner.scan_row(&mut self.grid, &cells);
      stats.rows_scanned += 1;

      let phase = self.cursor.phase();
      self.cursor.advance(dims);
      if !self.cursor.is_finished() && self.cursor.phase() != phase {
        debug!(phase = self.cursor.phase(), "Scan phase complete");
      }
    }

    if !self.cursor.is_finished() {
      return;
    }

    let visible = self.grid.visible_count();
    let hidden = self.grid.len() - visible;
    info!(visible, hidden, "Main visibility pass complete");

    if self.config.enable_sub_sampling && hidden > 0 {
      self.worklist = self.grid.hidden_indices();
      self.work_cursor = 0;
      self.phase = RunPhase::SubSampling;
      debug!(cells = self.worklist.len(), "Sub-sampling hidden cells");
    } else {
      self.phase = RunPhase::Idle;
    }
  }

  fn advance_sub_sampling<P: SceneProbe + ?Sized>(
    &mut self,
    scanner: &mut RowScanner<'_, P>,
    budget: StepBudget,
    stats: &mut StepStats,
  ) {
    while self.work_cursor < self.worklist.len() && budget.allows(stats.units()) {
      let index = self.worklist[self.work_cursor];
      self.work_cursor += 1;

      let outcome = self.sampler.refine(&mut self.grid, index, scanner);
      if outcome.did_work() {
        stats.cells_refined += 1;
      }
      if outcome == Refinement::Promoted {
        stats.cells_promoted += 1;
      }
    }

    if self.work_cursor >= self.worklist.len() {
      self.worklist.clear();
      self.work_cursor = 0;
      self.phase = RunPhase::Idle;
    }
  }

  fn finalize(&mut self, debug: &mut dyn DebugDraw) {
    let grid = std::mem::take(&mut self.grid);
    self.result = AnalysisResult::from_grid(grid);

    if self.config.debug.points() {
      let grid = &self.result.grid;
      for (index, cell) in grid.cells().iter().enumerate() {
        let style = if cell.is_visible() {
          DebugStyle::VisibleCell
        } else {
          DebugStyle::HiddenCell
        };
        debug.point(grid.cell_center(index), style);
      }
    }

    if let Some(started) = self.run_started.take() {
      self.metrics.record_run(started.elapsed().as_micros() as u64);
    }

    info!(
      visible = self.result.visible_count,
      hidden = self.result.hidden_count,
      percentage = self.result.visibility_percentage(),
      "Volume analysis complete"
    );

    if let Some(callback) = self.on_complete.as_mut() {
      callback(&self.result);
    }
  }

  /// Result of the last completed run (empty before the first one).
  #[inline]
  pub fn results(&self) -> &AnalysisResult {
    &self.result
  }

  #[inline]
  pub fn visible_count(&self) -> usize {
    self.result.visible_count
  }

  #[inline]
  pub fn hidden_count(&self) -> usize {
    self.result.hidden_count
  }

  pub fn visibility_percentage(&self) -> f64 {
    percentage(self.result.visible_count, self.result.hidden_count)
  }

  /// Grid of the run in flight, or of the last result when idle.
  pub fn grid(&self) -> &VoxelGrid {
    if self.is_running() {
      &self.grid
    } else {
      &self.result.grid
    }
  }

  #[inline]
  pub fn phase(&self) -> RunPhase {
    self.phase
  }

  #[inline]
  pub fn is_running(&self) -> bool {
    self.phase != RunPhase::Idle
  }

  #[inline]
  pub fn is_sub_sampling(&self) -> bool {
    self.phase == RunPhase::SubSampling
  }

  #[inline]
  pub fn config(&self) -> &AnalysisConfig {
    &self.config
  }

  /// Bounds of the current (or last) run.
  #[inline]
  pub fn bounds(&self) -> DAabb3 {
    self.bounds
  }

  /// Per-axis main cell size of the current (or last) run.
  #[inline]
  pub fn cell_size(&self) -> DVec3 {
    self.cell_size
  }

  /// Main-pass lines done out of the total.
  #[inline]
  pub fn scan_progress(&self) -> (usize, usize) {
    self.cursor.progress(self.grid().dims())
  }

  /// Sub-sampling worklist entries done out of the total.
  #[inline]
  pub fn sub_sampling_progress(&self) -> (usize, usize) {
    (self.work_cursor, self.worklist.len())
  }

  /// Statistics of the most recent step.
  #[inline]
  pub fn last_stats(&self) -> StepStats {
    self.last_stats
  }

  #[inline]
  pub fn metrics(&self) -> &AnalysisMetrics {
    &self.metrics
  }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
