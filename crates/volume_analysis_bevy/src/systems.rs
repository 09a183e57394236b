//! Per-frame driver, gizmo replay and results overlay.

use avian3d::prelude::*;
use bevy::prelude::*;
use volume_analysis::{AnalysisError, RunStatus};

use crate::components::{AnalysisOverlay, AnalysisVolume, VolumeAnalyzer};
use crate::gizmo::GizmoDebugDraw;
use crate::probe::AvianSceneProbe;

/// Fired once when an analyzer finishes a run.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct AnalysisCompleted {
  pub entity: Entity,
  pub visible_count: usize,
  pub hidden_count: usize,
  pub percentage: f64,
}

/// Fired when a start failed its preconditions or a run was abandoned
/// because no physics scene was available.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct AnalysisAborted {
  pub entity: Entity,
  pub error: AnalysisError,
}

/// Apply start/stop/clear requests.
pub fn apply_analyzer_commands(
  mut aborted: EventWriter<AnalysisAborted>,
  mut analyzers: Query<(
    Entity,
    &mut VolumeAnalyzer,
    Option<&GlobalTransform>,
    Option<&AnalysisVolume>,
  )>,
) {
  for (entity, mut analyzer, transform, volume) in &mut analyzers {
    if analyzer.pending().is_none() {
      continue;
    }
    let corners = match (volume, transform) {
      (Some(volume), Some(transform)) => Some(volume.world_corners(transform)),
      _ => None,
    };
    if let Some(error) = analyzer.apply_pending(entity, corners) {
      aborted.write(AnalysisAborted { entity, error });
    }
  }
}

/// Advance every running analyzer by its per-frame budget.
pub fn step_volume_analysis(
  spatial: SpatialQuery,
  mut analyzers: Query<(Entity, &mut VolumeAnalyzer)>,
  mut completed: EventWriter<AnalysisCompleted>,
  mut aborted: EventWriter<AnalysisAborted>,
) {
  let probe = AvianSceneProbe::new(&spatial);
  for (entity, mut analyzer) in &mut analyzers {
    if !analyzer.analysis().is_running() {
      continue;
    }
    match analyzer.step_with(&probe) {
      RunStatus::Completed => {
        let analysis = analyzer.analysis();
        info!(
          "Volume analysis on {entity}: {:.1}% visible ({} / {})",
          analysis.visibility_percentage(),
          analysis.visible_count(),
          analysis.visible_count() + analysis.hidden_count(),
        );
        completed.write(AnalysisCompleted {
          entity,
          visible_count: analysis.visible_count(),
          hidden_count: analysis.hidden_count(),
          percentage: analysis.visibility_percentage(),
        });
      }
      RunStatus::Aborted => {
        aborted.write(AnalysisAborted {
          entity,
          error: AnalysisError::MissingScene,
        });
      }
      RunStatus::Idle | RunStatus::Continuing => {}
    }
  }
}

/// Redraw recorded debug primitives every frame.
pub fn draw_analysis_gizmos(mut gizmos: Gizmos, analyzers: Query<&VolumeAnalyzer>) {
  for analyzer in &analyzers {
    let recorded = analyzer.debug_primitives();
    if recorded.primitives.is_empty() {
      continue;
    }
    let mut sink = GizmoDebugDraw::new(&mut gizmos, analyzer.point_radius);
    recorded.replay(&mut sink);
  }
}

/// One status line per analyzer.
pub fn overlay_line(entity: Entity, analyzer: &VolumeAnalyzer) -> String {
  let analysis = analyzer.analysis();
  if analysis.is_sub_sampling() {
    let (done, total) = analysis.sub_sampling_progress();
    format!("{entity}: sub-sampling {done}/{total}")
  } else if analysis.is_running() {
    let (done, total) = analysis.scan_progress();
    format!("{entity}: scanning {done}/{total} lines")
  } else if analysis.results().is_empty() {
    format!("{entity}: idle")
  } else {
    format!(
      "{entity}: {:.1}% visible ({} visible, {} hidden)",
      analysis.visibility_percentage(),
      analysis.visible_count(),
      analysis.hidden_count()
    )
  }
}

/// Write analyzer status into every [`AnalysisOverlay`] text.
pub fn update_analysis_overlay(
  analyzers: Query<(Entity, &VolumeAnalyzer)>,
  mut overlays: Query<&mut Text, With<AnalysisOverlay>>,
) {
  if overlays.is_empty() {
    return;
  }
  let lines: Vec<String> = analyzers
    .iter()
    .map(|(entity, analyzer)| overlay_line(entity, analyzer))
    .collect();
  let content = lines.join("\n");
  for mut text in &mut overlays {
    if text.0 != content {
      text.0.clone_from(&content);
    }
  }
}

/// Spawn a corner overlay text.
pub fn spawn_analysis_overlay(mut commands: Commands) {
  commands.spawn((
    Text::new(""),
    TextFont {
      font_size: 14.0,
      ..default()
    },
    Node {
      position_type: PositionType::Absolute,
      bottom: Val::Px(8.0),
      left: Val::Px(8.0),
      ..default()
    },
    AnalysisOverlay,
  ));
}
