//! Benchmarks for visibility analysis - full runs over analytic scenes.
//!
//! The occluded workload puts a pillar grid inside the volume so that rows
//! split into many segments and sub-sampling has hidden cells to work on.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::DVec3;
use volume_analysis::scan::{RowScanner, ScanPolicy};
use volume_analysis::scenes::{EmptyScene, OccluderScene};
use volume_analysis::{AnalysisConfig, DAabb3, GridDims, NoDebugDraw, StepBudget, VolumeAnalysis, VoxelGrid};

const VOLUME_SIZE: f64 = 32.0;

/// 3x3 pillars running through the full height of the volume.
fn pillar_scene() -> OccluderScene {
	let mut scene = OccluderScene::new();
	for i in 1..=3 {
		for j in 1..=3 {
			let center = DVec3::new(i as f64 * 8.0, j as f64 * 8.0, VOLUME_SIZE * 0.5);
			let half = DVec3::new(1.0, 1.0, VOLUME_SIZE);
			scene = scene.with_box(center - half, center + half);
		}
	}
	scene
}

fn config(cells: usize) -> AnalysisConfig {
	AnalysisConfig::from_corners(DVec3::ZERO, DVec3::splat(VOLUME_SIZE))
		.with_sample_counts(GridDims::splat(cells))
		.with_center_test(0.0)
}

// ============================================================================
// Row scanning
// ============================================================================

/// Main pass only, empty vs occluded scene.
fn bench_main_pass(c: &mut Criterion) {
	let mut group = c.benchmark_group("main_pass");
	let pillars = pillar_scene();

	for cells in [8usize, 16, 32] {
		let bounds = DAabb3::new(DVec3::ZERO, DVec3::splat(VOLUME_SIZE));
		let dims = GridDims::splat(cells);
		group.throughput(Throughput::Elements(dims.cell_count() as u64));

		group.bench_with_input(BenchmarkId::new("empty", cells), &dims, |b, dims| {
			let policy = ScanPolicy::default();
			b.iter(|| {
				let mut grid = VoxelGrid::generate(&bounds, *dims).unwrap();
				let mut debug = NoDebugDraw;
				RowScanner::new(&EmptyScene, &policy, &mut debug).scan_all(&mut grid);
				black_box(grid.visible_count())
			})
		});

		group.bench_with_input(BenchmarkId::new("pillars", cells), &dims, |b, dims| {
			let policy = ScanPolicy {
				center_radius: Some(0.25),
				..Default::default()
			};
			b.iter(|| {
				let mut grid = VoxelGrid::generate(&bounds, *dims).unwrap();
				let mut debug = NoDebugDraw;
				RowScanner::new(&pillars, &policy, &mut debug).scan_all(&mut grid);
				black_box(grid.visible_count())
			})
		});
	}

	group.finish();
}

// ============================================================================
// Full runs
// ============================================================================

/// Complete run including sub-sampling, stepped with different budgets.
fn bench_full_run(c: &mut Criterion) {
	let mut group = c.benchmark_group("full_run_16");
	let pillars = pillar_scene();

	for rows in [0usize, 16, 128] {
		group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, rows| {
			b.iter(|| {
				let mut analysis = VolumeAnalysis::new();
				analysis.start(config(16)).unwrap();
				analysis.run_to_end(&pillars, StepBudget::rows(*rows), &mut NoDebugDraw);
				black_box(analysis.visible_count())
			})
		});
	}

	group.finish();
}

criterion_group!(benches, bench_main_pass, bench_full_run);
criterion_main!(benches);
