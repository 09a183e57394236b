//! Error types for analysis setup and persistence.

use thiserror::Error;

use crate::geometry::DAabb3;

/// Reasons an analysis run (or a grid) could not be set up.
///
/// None of these are fatal: the controller logs them, stays idle and keeps
/// reporting empty results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
  /// Fewer than two finite input points.
  #[error("insufficient valid volume points: {found} (need at least 2)")]
  InsufficientPoints { found: usize },

  /// All input points coincide.
  #[error("volume points are all identical; the bounding box is degenerate")]
  DegenerateBounds,

  /// The bounding box is inverted or not finite.
  #[error("invalid bounding box: min {:?} max {:?}", .0.min, .0.max)]
  InvalidBounds(DAabb3),

  /// A per-axis sample count is zero.
  #[error("sample counts must be at least 1 on every axis, got {x}x{y}x{z}")]
  InvalidSampleCounts { x: usize, y: usize, z: usize },

  /// The grid would need more corner points than a pool can address.
  #[error("sample counts {x}x{y}x{z} need too many grid points")]
  TooManyCells { x: usize, y: usize, z: usize },

  /// The scene probe reports no attached scene.
  #[error("no scene attached to probe against")]
  MissingScene,
}

/// Errors from reading persisted cell data.
#[derive(Debug, Error)]
pub enum PersistError {
  /// Malformed JSON or a value of the wrong shape.
  #[error("malformed cell data: {0}")]
  Json(#[from] serde_json::Error),

  /// A result set document was not a JSON array.
  #[error("expected a JSON array of cells")]
  NotAnArray,

  /// Loaded cells hold more distinct corners than a pool can address.
  #[error("too many distinct corner points")]
  TooManyPoints,

  /// Loaded cells do not fill the requested grid.
  #[error("grid needs {expected} cells, got {found}")]
  CellCountMismatch { expected: usize, found: usize },
}
