//! Bevy presentation layer for volume_analysis.
//!
//! Bridges the engine-independent analysis with Bevy: avian3d spatial
//! queries answer the probes, gizmos show the debug primitives and a
//! per-frame system steps every [`VolumeAnalyzer`] within its budget.

pub mod components;
pub mod gizmo;
pub mod probe;
pub mod systems;

use bevy::prelude::*;
pub use components::*;
pub use gizmo::GizmoDebugDraw;
pub use probe::AvianSceneProbe;
pub use systems::{AnalysisAborted, AnalysisCompleted};

/// Bevy plugin driving volume analyzers.
///
/// Expects avian's `PhysicsPlugins` to be added by the app.
#[derive(Default)]
pub struct VolumeAnalysisPlugin {
	/// Spawn a text overlay listing analyzer progress.
	pub overlay: bool,
}

impl Plugin for VolumeAnalysisPlugin {
	fn build(&self, app: &mut App) {
		app.add_event::<AnalysisCompleted>()
			.add_event::<AnalysisAborted>()
			.add_systems(
				Update,
				(
					systems::apply_analyzer_commands,
					systems::step_volume_analysis,
					systems::draw_analysis_gizmos,
				)
					.chain(),
			)
			.add_systems(Update, systems::update_analysis_overlay);

		if self.overlay {
			app.add_systems(Startup, systems::spawn_analysis_overlay);
		}
	}
}
