//! Headless volume visibility analysis.
//!
//! Runs the analysis against a scene of analytic boxes and spheres read from
//! a TOML file and writes the per-cell results as JSON.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use volume_analysis::{persist, RunStatus, StepBudget, VolumeAnalysis};

use config::Config;

/// Headless volume visibility analysis.
#[derive(Parser, Debug)]
#[command(name = "analyze_volume")]
#[command(about = "Classifies voxel cells of a volume as visible or hidden")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output JSON file (default: print a summary only).
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Work units per step (default: from config, 0 = unlimited).
	#[arg(short, long)]
	rows_per_step: Option<usize>,

	/// Pretty-print the JSON output.
	#[arg(long)]
	pretty: bool,
}

fn main() -> Result<()> {
	env_logger::init();
	let args = Args::parse();

	println!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;
	let scene = config.scene();
	let budget = args
		.rows_per_step
		.map(StepBudget::rows)
		.unwrap_or_else(|| config.analysis.step_budget());

	println!(
		"Analysing {} points over {} occluders",
		config.analysis.volume_points.len(),
		scene.len()
	);

	let mut analysis = VolumeAnalysis::new();
	analysis
		.start(config.analysis)
		.context("Failed to start analysis")?;
	info!(
		"Grid {:?}, cell size {:?}",
		analysis.grid().dims(),
		analysis.cell_size()
	);

	let mut steps = 0usize;
	let status = loop {
		let status = analysis.step(&scene, budget);
		steps += 1;
		if !status.is_continuing() {
			break status;
		}
		if analysis.is_sub_sampling() {
			let (done, total) = analysis.sub_sampling_progress();
			debug!("Step {steps}: sub-sampling {done}/{total}");
		} else {
			let (done, total) = analysis.scan_progress();
			debug!("Step {steps}: scanning {done}/{total}");
		}
	};
	anyhow::ensure!(
		status == RunStatus::Completed,
		"Analysis ended with {status:?}"
	);

	println!(
		"Visible: {}  Hidden: {}  ({:.1}% visible, {} steps)",
		analysis.visible_count(),
		analysis.hidden_count(),
		analysis.visibility_percentage(),
		steps
	);

	#[cfg(feature = "metrics")]
	{
		let metrics = analysis.metrics();
		println!(
			"Run: {} us, avg step {:.1} us, {} probes, {} overlap tests",
			metrics.last_run_us,
			metrics.avg_step_timing_us(),
			metrics.total_probes,
			metrics.total_overlaps
		);
	}

	if let Some(output) = &args.output {
		let json = persist::result_to_json(analysis.results(), args.pretty)?;
		std::fs::write(output, json)
			.with_context(|| format!("Failed to write output: {}", output.display()))?;
		println!("Wrote {}", output.display());
	}

	Ok(())
}
