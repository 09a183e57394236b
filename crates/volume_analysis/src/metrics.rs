//! Per-step analysis metrics.
//!
//! Feature-gated and runtime-toggled so a build without `metrics` pays
//! nothing beyond an empty struct.
//!
//! # Usage
//!
//! ```ignore
//! use volume_analysis::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let m = analysis.metrics();
//! println!("avg step {:.1} us", m.avg_step_timing_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::budget::StepStats;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Fixed-capacity history of recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = self.buffer.iter().min()?;
        let max = self.buffer.iter().max()?;
        Some((*min, *max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128)
    }
}

/// Step timings and probe counts of the current controller.
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetrics {
    /// Wall time per step in microseconds.
    pub step_timings: RollingWindow<u64>,
    /// Segment probes per step.
    pub probes_per_step: RollingWindow<u64>,
    /// Wall time of the last finished run in microseconds.
    pub last_run_us: u64,
    /// Steps taken by the current (or last) run.
    pub steps: u64,
    /// Segment probes issued by the current (or last) run.
    pub total_probes: u64,
    /// Overlap tests issued by the current (or last) run.
    pub total_overlaps: u64,
}

impl AnalysisMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous run.
    pub fn reset(&mut self) {
        self.step_timings.clear();
        self.probes_per_step.clear();
        self.steps = 0;
        self.total_probes = 0;
        self.total_overlaps = 0;
        // last_run_us stays until the next run finishes
    }

    pub fn record_step(&mut self, timing_us: u64, stats: &StepStats) {
        if !is_enabled() {
            return;
        }
        self.step_timings.push(timing_us);
        self.probes_per_step.push(stats.scan.segment_probes as u64);
        self.steps += 1;
        self.total_probes += stats.scan.segment_probes as u64;
        self.total_overlaps += stats.scan.overlap_tests as u64;
    }

    pub fn record_run(&mut self, timing_us: u64) {
        if is_enabled() {
            self.last_run_us = timing_us;
        }
    }

    pub fn avg_step_timing_us(&self) -> f64 {
        self.step_timings.average()
    }

    pub fn avg_probes_per_step(&self) -> f64 {
        self.probes_per_step.average()
    }
}
