//! Per-step work limits for incremental analysis.
//!
//! Keeps a host frame from stalling on a large grid by bounding how much of
//! the run one [`step`](crate::VolumeAnalysis::step) call may perform.

use crate::scan::ScanStats;

/// Work limit for one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepBudget {
	/// Maximum work units per step (0 = unlimited).
	///
	/// A unit is one scan line during the main pass and one refined cell
	/// during sub-sampling.
	pub max_rows: usize,
}

impl StepBudget {
	/// Default budget with a modest per-frame limit.
	pub const DEFAULT: Self = Self { max_rows: 16 };

	/// Unlimited budget: the whole run completes in one step.
	pub const UNLIMITED: Self = Self { max_rows: 0 };

	/// Budget of `max_rows` units per step (0 = unlimited).
	#[inline]
	pub const fn rows(max_rows: usize) -> Self {
		Self { max_rows }
	}

	#[inline]
	pub fn is_unlimited(&self) -> bool {
		self.max_rows == 0
	}

	/// Check if more units can be performed.
	#[inline]
	pub fn allows(&self, performed: usize) -> bool {
		self.max_rows == 0 || performed < self.max_rows
	}
}

impl Default for StepBudget {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Statistics from one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
	/// Main-pass lines scanned.
	pub rows_scanned: usize,
	/// Hidden cells sent through sub-sampling.
	pub cells_refined: usize,
	/// Refined cells promoted to visible.
	pub cells_promoted: usize,
	/// Probe counters, main pass and sub-sampling together.
	pub scan: ScanStats,
}

impl StepStats {
	/// Budget units consumed.
	#[inline]
	pub fn units(&self) -> usize {
		self.rows_scanned + self.cells_refined
	}
}
