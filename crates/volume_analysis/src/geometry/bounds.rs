//! Axis-aligned bounding box with double precision.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Used for the analysed volume, for every voxel cell and for analytic
/// occluders. An *empty* box has inverted extents and is not valid until a
/// point has been encapsulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl DAabb3 {
	/// Inverted box, ready for encapsulation. Not valid.
	pub const EMPTY: Self = Self {
		min: DVec3::splat(f64::INFINITY),
		max: DVec3::splat(f64::NEG_INFINITY),
	};

	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Min/max reduction over a set of points.
	///
	/// Returns [`DAabb3::EMPTY`] when the iterator yields nothing.
	pub fn from_points<I>(points: I) -> Self
	where
		I: IntoIterator<Item = DVec3>,
	{
		let mut aabb = Self::EMPTY;
		for point in points {
			aabb.encapsulate(point);
		}
		aabb
	}

	/// Expand the box to include a point.
	#[inline]
	pub fn encapsulate(&mut self, point: DVec3) {
		self.min = self.min.min(point);
		self.max = self.max.max(point);
	}

	/// Check if the box is valid (finite, min <= max on all axes).
	#[inline]
	pub fn is_valid(&self) -> bool {
		self.min.is_finite()
			&& self.max.is_finite()
			&& self.min.x <= self.max.x
			&& self.min.y <= self.max.y
			&& self.min.z <= self.max.z
	}

	/// Closest point inside the box to `point`.
	#[inline]
	pub fn closest_point(&self, point: DVec3) -> DVec3 {
		point.clamp(self.min, self.max)
	}

	/// Get the size of the AABB (max - min).
	#[inline]
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}

	/// Get the center of the AABB.
	#[inline]
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	/// Entry fraction of the segment `start -> end` into the box, slab method.
	///
	/// Returns `None` when the segment misses the box. A segment starting
	/// inside the box enters at fraction 0.
	pub fn segment_entry(&self, start: DVec3, end: DVec3) -> Option<f64> {
		let delta = end - start;
		let mut t_min = 0.0_f64;
		let mut t_max = 1.0_f64;

		for axis in 0..3 {
			let origin = start[axis];
			let d = delta[axis];
			let (lo, hi) = (self.min[axis], self.max[axis]);

			if d.abs() < f64::EPSILON {
				if origin < lo || origin > hi {
					return None;
				}
				continue;
			}

			let inv = 1.0 / d;
			let mut t0 = (lo - origin) * inv;
			let mut t1 = (hi - origin) * inv;
			if t0 > t1 {
				std::mem::swap(&mut t0, &mut t1);
			}
			t_min = t_min.max(t0);
			t_max = t_max.min(t1);
			if t_min > t_max {
				return None;
			}
		}

		Some(t_min)
	}
}

impl Default for DAabb3 {
	fn default() -> Self {
		Self::EMPTY
	}
}
