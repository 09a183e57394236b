//! Configuration parsing for headless analysis runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use volume_analysis::scenes::{OccluderScene, OccluderShape};
use volume_analysis::AnalysisConfig;

/// Root configuration: the analysis plus the scene it runs against.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Analysis settings (volume points, sample counts, probing options).
	pub analysis: AnalysisConfig,
	/// Solid objects making up the scene.
	pub occluders: Vec<OccluderEntry>,
}

/// A single occluder in the scene.
#[derive(Debug, Deserialize)]
pub struct OccluderEntry {
	#[serde(flatten)]
	pub shape: OccluderShape,
	/// Channels this occluder blocks (default: all).
	#[serde(default)]
	pub channels: Option<Vec<u8>>,
}

impl OccluderEntry {
	/// Channel bitmask (bit n = channel n).
	pub fn channel_mask(&self) -> u32 {
		match &self.channels {
			None => u32::MAX,
			Some(channels) => channels
				.iter()
				.filter_map(|c| 1u32.checked_shl(*c as u32))
				.fold(0, |mask, bit| mask | bit),
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config: {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
	}

	pub fn parse(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Build the occluder scene; actor ids follow declaration order.
	pub fn scene(&self) -> OccluderScene {
		let mut scene = OccluderScene::new();
		for entry in &self.occluders {
			scene.push(entry.shape, entry.channel_mask());
		}
		scene
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use volume_analysis::glam::DVec3;
	use volume_analysis::GridDims;

	const SAMPLE: &str = r#"
[analysis]
volume_points = [[0.0, 0.0, 0.0], [4.0, 2.0, 4.0]]
sample_counts = { x = 8, y = 4, z = 8 }
max_trace_distance = 2.5
rows_per_step = 32

[analysis.center_test]
enabled = true
radius = 0.1

[[occluders]]
kind = "box"
min = [1.0, 0.0, 1.0]
max = [2.0, 2.0, 2.0]

[[occluders]]
kind = "sphere"
center = [3.0, 1.0, 3.0]
radius = 0.5
channels = [1]
"#;

	#[test]
	fn test_parse_sample() {
		let config = Config::parse(SAMPLE).unwrap();

		assert_eq!(config.analysis.volume_points.len(), 2);
		assert_eq!(config.analysis.sample_counts, GridDims::new(8, 4, 8));
		// Unspecified fields keep their defaults
		assert_eq!(config.analysis.sub_sample_counts, GridDims::splat(3));
		assert!(config.analysis.enable_sub_sampling);
		assert!(config.analysis.center_test.enabled);
		assert_eq!(config.analysis.rows_per_step, 32);

		assert_eq!(config.occluders.len(), 2);
		assert_eq!(
			config.occluders[1].shape,
			OccluderShape::Sphere {
				center: DVec3::new(3.0, 1.0, 3.0),
				radius: 0.5
			}
		);
	}

	#[test]
	fn test_channel_masks() {
		let config = Config::parse(SAMPLE).unwrap();
		assert_eq!(config.occluders[0].channel_mask(), u32::MAX);
		assert_eq!(config.occluders[1].channel_mask(), 0b10);

		let scene = config.scene();
		assert_eq!(scene.len(), 2);
		assert_eq!(scene.occluders()[1].channels, 0b10);
	}

	#[test]
	fn test_empty_config_is_default() {
		let config = Config::parse("").unwrap();
		assert!(config.occluders.is_empty());
		assert!(config.analysis.volume_points.is_empty());
	}

	#[test]
	fn test_unknown_shape_is_rejected() {
		let err = Config::parse("[[occluders]]\nkind = \"cone\"\n");
		assert!(err.is_err());
	}
}
