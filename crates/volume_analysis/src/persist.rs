//! JSON persistence of cells and result sets.
//!
//! One cell is stored as
//!
//! ```json
//! {
//!   "VisibilityMask": 1,
//!   "Points": {
//!     "BottomBackwardLeft": { "X": 0.0, "Y": 0.0, "Z": 0.0 },
//!     "TopForwardRight":    { "X": 1.0, "Y": 1.0, "Z": 1.0 }
//!   }
//! }
//! ```
//!
//! and a result set as a JSON array of cells. Unpopulated corners are
//! omitted on save and stay unset on load; unknown corner names are skipped.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::PersistError;
use crate::geometry::BoxCorner;
use crate::grid::{GridDims, PointPool, VoxelCell, VoxelGrid, HIDDEN, VISIBLE};
use crate::result::AnalysisResult;

/// A cell with its corner positions resolved, independent of any pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoadedCellDoc", into = "CellDoc")]
pub struct CellRecord {
  /// [`HIDDEN`] or [`VISIBLE`]; loaded masks are normalised.
  pub visibility_mask: u8,
  /// Corner positions indexed by [`BoxCorner::index`].
  pub points: [Option<DVec3>; 8],
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PointDoc {
  x: f64,
  y: f64,
  z: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CellDoc {
  visibility_mask: u8,
  points: BTreeMap<String, PointDoc>,
}

/// Read side of [`CellDoc`]: any integer mask, corners parsed by name.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct LoadedCellDoc {
  visibility_mask: i64,
  points: BTreeMap<String, Value>,
}

impl TryFrom<LoadedCellDoc> for CellRecord {
  type Error = serde_json::Error;

  fn try_from(doc: LoadedCellDoc) -> Result<Self, Self::Error> {
    let mut record = CellRecord {
      visibility_mask: if doc.visibility_mask != 0 { VISIBLE } else { HIDDEN },
      ..Default::default()
    };
    for (name, value) in doc.points {
      let Some(corner) = BoxCorner::from_name(&name) else {
        continue;
      };
      let p: PointDoc = serde_json::from_value(value)?;
      record.points[corner.index()] = Some(DVec3::new(p.x, p.y, p.z));
    }
    Ok(record)
  }
}

impl From<CellRecord> for CellDoc {
  fn from(record: CellRecord) -> Self {
    let points = BoxCorner::ALL
      .into_iter()
      .filter_map(|corner| {
        record.points[corner.index()].map(|p| {
          (
            corner.name().to_owned(),
            PointDoc {
              x: p.x,
              y: p.y,
              z: p.z,
            },
          )
        })
      })
      .collect();
    CellDoc {
      visibility_mask: record.visibility_mask,
      points,
    }
  }
}

impl CellRecord {
  /// Resolve a cell's corners against its pool.
  pub fn from_cell(cell: &VoxelCell, pool: &PointPool) -> Self {
    let mut record = CellRecord {
      visibility_mask: cell.visibility_mask,
      ..Default::default()
    };
    for (corner, p) in cell.corner_positions(pool) {
      record.points[corner.index()] = Some(p);
    }
    record
  }

  #[inline]
  pub fn corner(&self, corner: BoxCorner) -> Option<DVec3> {
    self.points[corner.index()]
  }

  #[inline]
  pub fn is_visible(&self) -> bool {
    self.visibility_mask != 0
  }

  pub fn to_value(&self) -> Result<Value, PersistError> {
    Ok(serde_json::to_value(self)?)
  }

  pub fn to_json(&self) -> Result<String, PersistError> {
    Ok(serde_json::to_string(self)?)
  }

  /// Parse one cell. A corner missing a coordinate fails the whole cell.
  pub fn from_json(text: &str) -> Result<Self, PersistError> {
    Ok(serde_json::from_str(text)?)
  }

  pub fn from_value(value: Value) -> Result<Self, PersistError> {
    Ok(serde_json::from_value(value)?)
  }
}

/// Records for every cell of a grid, in grid order.
pub fn grid_records(grid: &VoxelGrid) -> Vec<CellRecord> {
  grid
    .cells()
    .iter()
    .map(|cell| CellRecord::from_cell(cell, grid.points()))
    .collect()
}

/// Serialize a grid as a JSON array of cells.
pub fn grid_to_json(grid: &VoxelGrid, pretty: bool) -> Result<String, PersistError> {
  let records = grid_records(grid);
  let text = if pretty {
    serde_json::to_string_pretty(&records)?
  } else {
    serde_json::to_string(&records)?
  };
  Ok(text)
}

/// Serialize a result's cells as a JSON array.
pub fn result_to_json(result: &AnalysisResult, pretty: bool) -> Result<String, PersistError> {
  grid_to_json(&result.grid, pretty)
}

/// Parse a JSON array of cells, best effort.
///
/// Entries that are not valid cells are dropped with a warning. Input that is
/// not a JSON array at all is an error.
pub fn records_from_json(text: &str) -> Result<Vec<CellRecord>, PersistError> {
  let Value::Array(entries) = serde_json::from_str::<Value>(text)? else {
    return Err(PersistError::NotAnArray);
  };

  let total = entries.len();
  let records: Vec<CellRecord> = entries
    .into_iter()
    .enumerate()
    .filter_map(|(i, entry)| match CellRecord::from_value(entry) {
      Ok(record) => Some(record),
      Err(err) => {
        warn!(entry = i, %err, "Skipping invalid cell");
        None
      }
    })
    .collect();

  if records.len() < total {
    warn!(
      loaded = records.len(),
      dropped = total - records.len(),
      "Cell array loaded partially"
    );
  }
  Ok(records)
}

/// Rebuild a grid from records, sharing identical corner positions.
pub fn grid_from_records(dims: GridDims, records: &[CellRecord]) -> Result<VoxelGrid, PersistError> {
  if dims.cell_count() != records.len() {
    return Err(PersistError::CellCountMismatch {
      expected: dims.cell_count(),
      found: records.len(),
    });
  }

  let mut pool = PointPool::default();
  let mut shared = HashMap::new();
  let mut cells = Vec::with_capacity(records.len());
  for record in records {
    let mut cell = VoxelCell {
      visibility_mask: record.visibility_mask,
      ..Default::default()
    };
    for corner in BoxCorner::ALL {
      let Some(p) = record.corner(corner) else {
        continue;
      };
      let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
      let id = match shared.entry(key) {
        Entry::Occupied(entry) => *entry.get(),
        Entry::Vacant(entry) => *entry.insert(pool.push(p).ok_or(PersistError::TooManyPoints)?),
      };
      cell.set_corner(corner, Some(id));
    }
    cells.push(cell);
  }

  VoxelGrid::from_parts(dims, cells, pool).ok_or(PersistError::CellCountMismatch {
    expected: dims.cell_count(),
    found: records.len(),
  })
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;
