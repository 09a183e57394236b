//! volume_analysis - Engine independent voxel visibility analysis
//!
//! Subdivides a box into a voxel grid and works out which cells can see each
//! other along straight lines through a scene. The scene is only reached
//! through the [`SceneProbe`] trait (one segment probe, one sphere overlap),
//! so the same analysis runs against a game engine's physics world or the
//! analytic scenes in [`scenes`].
//!
//! # Features
//!
//! - **Segmented row scanning**: each grid line along X, Y and Z is covered
//!   with as few long probes as possible, bounded by a max trace distance
//! - **Center test**: optional sphere check that keeps cells buried in
//!   geometry hidden
//! - **Sub-sampling**: hidden cells get a finer second pass
//! - **Time slicing**: [`VolumeAnalysis::step`] does a bounded amount of work
//!   per call, for per-frame drivers
//! - **JSON persistence** of cells and result sets ([`persist`])
//!
//! # Example
//!
//! ```ignore
//! use volume_analysis::{AnalysisConfig, GridDims, StepBudget, VolumeAnalysis};
//! use volume_analysis::scenes::OccluderScene;
//!
//! let scene = OccluderScene::new().with_box(DVec3::new(4.0, 0.0, 0.0), DVec3::new(5.0, 8.0, 8.0));
//! let config = AnalysisConfig::from_corners(DVec3::ZERO, DVec3::splat(8.0))
//!     .with_sample_counts(GridDims::splat(8));
//!
//! let mut analysis = VolumeAnalysis::new();
//! analysis.start(config)?;
//! while analysis.step(&scene, StepBudget::DEFAULT).is_continuing() {}
//!
//! println!("{:.1}% visible", analysis.visibility_percentage());
//! ```

pub mod budget;
pub mod config;
pub mod controller;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod metrics;
pub mod persist;
pub mod probe;
pub mod refine;
pub mod result;
pub mod scan;
pub mod scenes;

// Re-export glam so adapters build points with the same version
pub use glam;

// Re-export commonly used items
pub use budget::{StepBudget, StepStats};
pub use config::{AnalysisConfig, CenterTest};
pub use controller::{CompletionCallback, RunPhase, RunStatus, VolumeAnalysis};
pub use draw::{DebugDraw, DebugDrawSettings, DebugStyle, NoDebugDraw};
pub use error::{AnalysisError, PersistError};
pub use geometry::{BoxCorner, DAabb3};
pub use grid::{GridDims, PointId, PointPool, VoxelCell, VoxelGrid};
pub use persist::CellRecord;
pub use probe::{ActorId, ProbeChannel, ProbeQuery, SceneProbe, SegmentHit};
pub use result::AnalysisResult;
