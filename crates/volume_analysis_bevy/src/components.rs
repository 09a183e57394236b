//! Bevy components for volume analysis.

use bevy::prelude::*;
use volume_analysis::draw::RecordingDebugDraw;
use volume_analysis::{
  AnalysisConfig, AnalysisError, RunStatus, SceneProbe, StepBudget, VolumeAnalysis,
};

use crate::probe::{actor_of, to_dvec3};

/// Requested lifecycle change, applied by the driver before the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyzerCommand {
  Start,
  Stop,
  Clear,
}

/// Entity that owns and drives one analysis run.
///
/// # Example
/// ```ignore
/// commands.spawn((
///     Transform::from_xyz(0.0, 4.0, 0.0),
///     AnalysisVolume::new(Vec3::new(16.0, 4.0, 16.0)),
///     VolumeAnalyzer::new(AnalysisConfig::default()).started(),
/// ));
/// ```
#[derive(Component)]
pub struct VolumeAnalyzer {
  pub config: AnalysisConfig,
  /// Work per frame.
  pub budget: StepBudget,
  /// Gizmo radius of result points.
  pub point_radius: f32,
  analysis: VolumeAnalysis,
  pending: Option<AnalyzerCommand>,
  debug: RecordingDebugDraw,
  last_status: RunStatus,
  last_error: Option<AnalysisError>,
}

impl VolumeAnalyzer {
  pub fn new(config: AnalysisConfig) -> Self {
    Self {
      budget: config.step_budget(),
      config,
      point_radius: 0.05,
      analysis: VolumeAnalysis::new(),
      pending: None,
      debug: RecordingDebugDraw::default(),
      last_status: RunStatus::Idle,
      last_error: None,
    }
  }

  /// Start on the first frame.
  pub fn started(mut self) -> Self {
    self.pending = Some(AnalyzerCommand::Start);
    self
  }

  pub fn request_start(&mut self) {
    self.pending = Some(AnalyzerCommand::Start);
  }

  pub fn request_stop(&mut self) {
    self.pending = Some(AnalyzerCommand::Stop);
  }

  pub fn request_clear(&mut self) {
    self.pending = Some(AnalyzerCommand::Clear);
  }

  #[inline]
  pub fn pending(&self) -> Option<AnalyzerCommand> {
    self.pending
  }

  #[inline]
  pub fn analysis(&self) -> &VolumeAnalysis {
    &self.analysis
  }

  #[inline]
  pub fn analysis_mut(&mut self) -> &mut VolumeAnalysis {
    &mut self.analysis
  }

  /// Debug primitives emitted by the current (or last) run.
  #[inline]
  pub fn debug_primitives(&self) -> &RecordingDebugDraw {
    &self.debug
  }

  #[inline]
  pub fn last_status(&self) -> RunStatus {
    self.last_status
  }

  /// Why the last start or step failed, cleared by the next successful one.
  #[inline]
  pub fn last_error(&self) -> Option<&AnalysisError> {
    self.last_error.as_ref()
  }

  /// Apply the pending command. `volume` overrides the configured points
  /// with the corners of an entity-attached volume.
  ///
  /// Returns the error of a start that failed its preconditions.
  pub(crate) fn apply_pending(
    &mut self,
    owner: Entity,
    volume: Option<[Vec3; 2]>,
  ) -> Option<AnalysisError> {
    let command = self.pending.take()?;
    match command {
      AnalyzerCommand::Start => {
        let mut config = self.config.clone();
        if let Some(corners) = volume {
          config.volume_points = corners.iter().map(|c| to_dvec3(*c)).collect();
        }
        if config.ignore_self && config.self_actor.is_none() {
          config.self_actor = Some(actor_of(owner));
        }
        self.debug.clear();
        self.last_error = self.analysis.start(config).err();
        self.last_status = RunStatus::Idle;
        return self.last_error.clone();
      }
      AnalyzerCommand::Stop => self.analysis.stop(),
      AnalyzerCommand::Clear => {
        self.analysis.clear();
        self.debug.clear();
        self.last_error = None;
      }
    }
    None
  }

  pub(crate) fn step_with<P: SceneProbe + ?Sized>(&mut self, scene: &P) -> RunStatus {
    let status = self
      .analysis
      .step_with_debug(scene, self.budget, &mut self.debug);
    self.last_status = status;
    self.last_error = (status == RunStatus::Aborted).then_some(AnalysisError::MissingScene);
    status
  }
}

/// Box volume centred on the entity's transform.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct AnalysisVolume {
  pub half_extents: Vec3,
}

impl AnalysisVolume {
  pub fn new(size: Vec3) -> Self {
    Self {
      half_extents: size * 0.5,
    }
  }

  /// World-space min and max corners under `transform` (rotation ignored).
  pub fn world_corners(&self, transform: &GlobalTransform) -> [Vec3; 2] {
    let center = transform.translation();
    let half = self.half_extents * transform.scale().abs();
    [center - half, center + half]
  }
}

/// Marker for a UI text entity showing analysis progress and results.
#[derive(Component, Default)]
pub struct AnalysisOverlay;

#[cfg(test)]
mod tests {
  use super::*;
  use volume_analysis::scenes::DetachedScene;

  #[test]
  fn test_volume_corners_follow_transform() {
    let volume = AnalysisVolume::new(Vec3::new(4.0, 2.0, 2.0));
    let transform = GlobalTransform::from(
      Transform::from_xyz(10.0, 0.0, -2.0).with_scale(Vec3::splat(2.0)),
    );
    let [min, max] = volume.world_corners(&transform);
    assert_eq!(min, Vec3::new(6.0, -2.0, -4.0));
    assert_eq!(max, Vec3::new(14.0, 2.0, 0.0));
  }

  #[test]
  fn test_start_uses_volume_and_owner() {
    let config = AnalysisConfig::default();
    let mut analyzer = VolumeAnalyzer::new(config).started();
    let owner = Entity::from_raw(3);

    analyzer.apply_pending(owner, Some([Vec3::ZERO, Vec3::splat(2.0)]));

    assert!(analyzer.pending().is_none());
    assert!(analyzer.analysis().is_running());
    assert_eq!(analyzer.analysis().config().self_actor, Some(actor_of(owner)));
    assert_eq!(analyzer.analysis().config().volume_points.len(), 2);
  }

  #[test]
  fn test_start_without_points_stays_idle() {
    let mut analyzer = VolumeAnalyzer::new(AnalysisConfig::default()).started();
    let err = analyzer.apply_pending(Entity::from_raw(1), None);
    assert!(!analyzer.analysis().is_running());
    assert_eq!(err, Some(AnalysisError::InsufficientPoints { found: 0 }));
    assert_eq!(analyzer.last_error(), err.as_ref());

    // A later successful start clears the error
    analyzer.request_start();
    let err = analyzer.apply_pending(Entity::from_raw(1), Some([Vec3::ZERO, Vec3::ONE]));
    assert_eq!(err, None);
    assert!(analyzer.last_error().is_none());
  }

  #[test]
  fn test_abort_is_recorded() {
    let mut analyzer = VolumeAnalyzer::new(AnalysisConfig::default()).started();
    analyzer.apply_pending(Entity::from_raw(1), Some([Vec3::ZERO, Vec3::ONE]));
    assert_eq!(analyzer.step_with(&DetachedScene), RunStatus::Aborted);
    assert_eq!(analyzer.last_error(), Some(&AnalysisError::MissingScene));
  }

  #[test]
  fn test_stop_request() {
    let mut analyzer = VolumeAnalyzer::new(AnalysisConfig::default()).started();
    analyzer.apply_pending(Entity::from_raw(1), Some([Vec3::ZERO, Vec3::ONE]));
    analyzer.request_stop();
    analyzer.apply_pending(Entity::from_raw(1), None);
    assert!(!analyzer.analysis().is_running());
  }
}
