use serde_json::json;

use super::*;
use crate::geometry::DAabb3;

fn unit_grid() -> VoxelGrid {
  let bounds = DAabb3::new(DVec3::ZERO, DVec3::new(2.0, 1.0, 1.0));
  VoxelGrid::generate(&bounds, GridDims::new(2, 1, 1)).unwrap()
}

#[test]
fn test_cell_layout_matches_documented_keys() {
  let mut grid = unit_grid();
  grid.mark_visible(1);
  let record = CellRecord::from_cell(&grid.cells()[1], grid.points());

  let value = record.to_value().unwrap();
  assert_eq!(value["VisibilityMask"], json!(1));
  assert_eq!(
    value["Points"]["BottomBackwardLeft"],
    json!({ "X": 1.0, "Y": 0.0, "Z": 0.0 })
  );
  assert_eq!(
    value["Points"]["TopForwardRight"],
    json!({ "X": 2.0, "Y": 1.0, "Z": 1.0 })
  );
  assert_eq!(value["Points"].as_object().unwrap().len(), 8);
}

#[test]
fn test_cell_round_trip_keeps_corners_and_mask() {
  let grid = unit_grid();
  let record = CellRecord::from_cell(&grid.cells()[0], grid.points());
  let parsed = CellRecord::from_json(&record.to_json().unwrap()).unwrap();

  assert_eq!(parsed, record);
  assert!(parsed.points.iter().all(Option::is_some));
  assert!(!parsed.is_visible());
}

#[test]
fn test_unpopulated_corners_are_omitted_and_stay_unset() {
  let mut record = CellRecord {
    visibility_mask: 1,
    ..Default::default()
  };
  record.points[BoxCorner::TopForwardLeft.index()] = Some(DVec3::new(1.0, 0.0, 1.0));

  let value = record.to_value().unwrap();
  let points = value["Points"].as_object().unwrap();
  assert_eq!(points.len(), 1);
  assert!(points.contains_key("TopForwardLeft"));

  let parsed = CellRecord::from_value(value).unwrap();
  assert_eq!(parsed.corner(BoxCorner::TopForwardLeft), Some(DVec3::new(1.0, 0.0, 1.0)));
  assert_eq!(parsed.corner(BoxCorner::BottomBackwardLeft), None);
}

#[test]
fn test_unknown_corner_names_are_skipped() {
  let parsed = CellRecord::from_json(
    r#"{
      "VisibilityMask": 1,
      "Points": {
        "Middle": { "X": 9.0, "Y": 9.0, "Z": 9.0 },
        "BottomForwardRight": { "X": 1.0, "Y": 1.0, "Z": 0.0 }
      }
    }"#,
  )
  .unwrap();

  assert!(parsed.is_visible());
  assert_eq!(parsed.points.iter().flatten().count(), 1);
  assert_eq!(parsed.corner(BoxCorner::BottomForwardRight), Some(DVec3::new(1.0, 1.0, 0.0)));
}

/// Values under unknown names are never parsed as points.
#[test]
fn test_unknown_corner_with_partial_point_is_skipped() {
  let parsed = CellRecord::from_json(
    r#"{"VisibilityMask":1,"Points":{"TopForwardRight":{"X":1,"Y":2,"Z":3},"Middle":{"X":1.0}}}"#,
  )
  .unwrap();
  assert_eq!(parsed.corner(BoxCorner::TopForwardRight), Some(DVec3::new(1.0, 2.0, 3.0)));
  assert_eq!(parsed.points.iter().flatten().count(), 1);

  let parsed = CellRecord::from_json(
    r#"{"VisibilityMask":0,"Points":{"Extra":"label","Notes":[1,2]}}"#,
  )
  .unwrap();
  assert_eq!(parsed.points.iter().flatten().count(), 0);
}

#[test]
fn test_any_nonzero_mask_loads_as_visible() {
  for (mask, visible) in [(256, true), (-1, true), (7, true), (0, false)] {
    let parsed = CellRecord::from_value(json!({ "VisibilityMask": mask })).unwrap();
    assert_eq!(parsed.is_visible(), visible, "mask {mask}");
    assert_eq!(parsed.visibility_mask, if visible { VISIBLE } else { HIDDEN });
  }
}

#[test]
fn test_missing_coordinate_fails_the_cell() {
  let err = CellRecord::from_json(
    r#"{ "VisibilityMask": 0, "Points": { "TopForwardLeft": { "X": 1.0, "Y": 2.0 } } }"#,
  )
  .unwrap_err();
  assert!(matches!(err, PersistError::Json(_)));
}

/// Invalid entries are dropped, the rest of the array still loads.
#[test]
fn test_array_load_is_best_effort() {
  let text = r#"[
    { "VisibilityMask": 1, "Points": {} },
    { "VisibilityMask": 0, "Points": { "TopForwardLeft": { "X": 1.0 } } },
    "not a cell",
    { "VisibilityMask": 0 }
  ]"#;
  let records = records_from_json(text).unwrap();
  assert_eq!(records.len(), 2);
  assert!(records[0].is_visible());
  assert!(!records[1].is_visible());
}

#[test]
fn test_non_array_input_is_an_error() {
  let err = records_from_json(r#"{ "VisibilityMask": 1 }"#).unwrap_err();
  assert!(matches!(err, PersistError::NotAnArray));

  let err = records_from_json("not json").unwrap_err();
  assert!(matches!(err, PersistError::Json(_)));
}

#[test]
fn test_grid_round_trip_restores_shared_corners() {
  let mut grid = unit_grid();
  grid.mark_visible(0);

  let text = grid_to_json(&grid, true).unwrap();
  let records = records_from_json(&text).unwrap();
  let restored = grid_from_records(grid.dims(), &records).unwrap();

  assert_eq!(restored.len(), 2);
  assert!(restored.is_visible(0));
  assert!(!restored.is_visible(1));
  // 2x1x1 lattice: 3 * 2 * 2 points, 4 of them shared between the cells
  assert_eq!(restored.points().len(), 12);
  for index in 0..2 {
    assert_eq!(restored.cell_aabb(index), grid.cell_aabb(index));
  }
}

#[test]
fn test_grid_from_records_checks_cell_count() {
  let records = grid_records(&unit_grid());
  let err = grid_from_records(GridDims::splat(2), &records).unwrap_err();
  assert!(matches!(
    err,
    PersistError::CellCountMismatch {
      expected: 8,
      found: 2
    }
  ));
}
