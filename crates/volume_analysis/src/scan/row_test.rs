use super::*;
use crate::draw::{DebugPrimitive, NoDebugDraw, RecordingDebugDraw};
use crate::geometry::DAabb3;
use crate::grid::GridDims;
use crate::scenes::{EmptyScene, OccluderScene};

/// A row of `n` unit cells along X, centers at x = 0.5, 1.5, ...
fn row_grid(n: usize) -> (VoxelGrid, Vec<usize>) {
  let bounds = DAabb3::new(DVec3::ZERO, DVec3::new(n as f64, 1.0, 1.0));
  let grid = VoxelGrid::generate(&bounds, GridDims::new(n, 1, 1)).unwrap();
  let row = ScanAxis::X.line_cells(grid.dims(), 0).to_vec();
  (grid, row)
}

fn visible(grid: &VoxelGrid) -> Vec<bool> {
  grid.cells().iter().map(|c| c.is_visible()).collect()
}

/// Thin wall spanning the whole row cross-section at x = 2.
fn wall_scene() -> OccluderScene {
  OccluderScene::new().with_box(DVec3::new(1.9, -1.0, -1.0), DVec3::new(2.1, 2.0, 2.0))
}

#[test]
fn test_clear_row_marks_everything_with_one_probe() {
  let (mut grid, row) = row_grid(6);
  let policy = ScanPolicy::default();
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&EmptyScene, &policy, &mut debug);

  scanner.scan_row(&mut grid, &row);

  assert_eq!(visible(&grid), vec![true; 6]);
  assert_eq!(scanner.stats().segment_probes, 1);
  assert_eq!(scanner.stats().cells_marked, 6);
  assert_eq!(scanner.stats().overlap_tests, 0);
}

/// A wall at the middle of a 4-cell row: the first probe stops before the
/// wall, the remainder is probed separately.
#[test]
fn test_wall_splits_row_into_segments() {
  let (mut grid, row) = row_grid(4);
  let scene = wall_scene();
  let policy = ScanPolicy {
    draw_rays: true,
    ..Default::default()
  };
  let mut debug = RecordingDebugDraw::default();
  {
    let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
    scanner.scan_row(&mut grid, &row);
    assert_eq!(scanner.stats().segment_probes, 2);
  }

  assert_eq!(visible(&grid), vec![true; 4]);
  assert_eq!(
    debug.primitives,
    vec![
      DebugPrimitive::Line {
        start: DVec3::new(0.5, 0.5, 0.5),
        end: DVec3::new(3.5, 0.5, 0.5),
        style: DebugStyle::BlockedRay,
      },
      DebugPrimitive::Line {
        start: DVec3::new(2.5, 0.5, 0.5),
        end: DVec3::new(3.5, 0.5, 0.5),
        style: DebugStyle::ClearRay,
      },
    ]
  );
}

/// Only the cells before the wall are marked by the blocked probe.
#[test]
fn test_blocked_probe_marks_prefix_only() {
  let (mut grid, row) = row_grid(4);
  let scene = wall_scene();
  let policy = ScanPolicy::default();
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);

  // Three cells, still spanning the wall.
  scanner.scan_row(&mut grid, &row[..3]);

  // Probe 0 -> 2 hits the wall at x = 1.9: cells 0 and 1 marked, then the
  // trailing cell 2 is accepted on its own.
  assert_eq!(visible(&grid), vec![true, true, true, false]);
  assert_eq!(scanner.stats().segment_probes, 1);
}

/// A solid block filling the last cell: with the center test the buried cell
/// stays hidden, without it the trailing cell is accepted.
#[test]
fn test_center_test_rejects_buried_cell() {
  let scene = OccluderScene::new().with_box(DVec3::new(3.0, -1.0, -1.0), DVec3::new(4.5, 2.0, 2.0));

  let (mut grid, row) = row_grid(4);
  let policy = ScanPolicy {
    center_radius: Some(0.1),
    ..Default::default()
  };
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert_eq!(visible(&grid), vec![true, true, true, false]);

  let (mut grid, row) = row_grid(4);
  let policy = ScanPolicy::default();
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert_eq!(visible(&grid), vec![true; 4]);
}

/// The center test vetoes one cell without breaking the span around it.
#[test]
fn test_center_veto_is_per_cell() {
  // Off the probe line (y = 0.5) but within 0.25 of cell 1's center.
  let scene = OccluderScene::new().with_box(DVec3::new(1.4, 0.6, 0.4), DVec3::new(1.6, 0.7, 0.6));
  let (mut grid, row) = row_grid(4);
  let policy = ScanPolicy {
    center_radius: Some(0.25),
    ..Default::default()
  };
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);

  assert_eq!(visible(&grid), vec![true, false, true, true]);
  assert_eq!(scanner.stats().segment_probes, 1);
  assert_eq!(scanner.stats().overlap_tests, 4);
}

#[test]
fn test_max_trace_distance_splits_probes() {
  let (mut grid, row) = row_grid(4);
  let policy = ScanPolicy {
    max_trace_distance: 1.0,
    ..Default::default()
  };
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&EmptyScene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert_eq!(visible(&grid), vec![true; 4]);
  // 0 -> 1, 2 -> 3
  assert_eq!(scanner.stats().segment_probes, 2);

  let (mut grid, row) = row_grid(4);
  let policy = ScanPolicy {
    max_trace_distance: 2.0,
    ..Default::default()
  };
  let mut scanner = RowScanner::new(&EmptyScene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert_eq!(visible(&grid), vec![true; 4]);
  // 0 -> 2, then cell 3 alone
  assert_eq!(scanner.stats().segment_probes, 1);
}

#[test]
fn test_single_cell_row_uses_center_test() {
  let (mut grid, row) = row_grid(1);
  let scene = OccluderScene::new().with_sphere(DVec3::new(0.5, 0.5, 0.5), 0.2);
  let policy = ScanPolicy {
    center_radius: Some(0.1),
    ..Default::default()
  };
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert!(!grid.is_visible(0));
  assert_eq!(scanner.stats().segment_probes, 0);

  let (mut grid, row) = row_grid(1);
  let mut scanner = RowScanner::new(&EmptyScene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);
  assert!(grid.is_visible(0));
}

/// Cells already visible keep their flag and are not re-tested.
#[test]
fn test_visible_cells_are_left_alone() {
  let (mut grid, row) = row_grid(4);
  grid.mark_visible(3);
  let scene = OccluderScene::new().with_box(DVec3::new(-1.0, -1.0, -1.0), DVec3::new(5.0, 2.0, 2.0));
  let policy = ScanPolicy {
    center_radius: Some(0.1),
    ..Default::default()
  };
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&scene, &policy, &mut debug);
  scanner.scan_row(&mut grid, &row);

  assert!(grid.is_visible(3), "visibility never goes back to hidden");
  assert_eq!(scanner.stats().cells_marked, 0);
  // Cells 0..=2 are each tested once; cell 3 is skipped.
  assert_eq!(scanner.stats().overlap_tests, 3);
}

#[test]
fn test_scan_all_covers_three_axes() {
  let bounds = DAabb3::new(DVec3::ZERO, DVec3::splat(3.0));
  let mut grid = VoxelGrid::generate(&bounds, GridDims::splat(3)).unwrap();
  let policy = ScanPolicy::default();
  let mut debug = NoDebugDraw;
  let mut scanner = RowScanner::new(&EmptyScene, &policy, &mut debug);
  scanner.scan_all(&mut grid);

  assert_eq!(grid.visible_count(), 27);
  // One probe per line, 9 lines per phase.
  assert_eq!(scanner.stats().segment_probes, 27);
}
