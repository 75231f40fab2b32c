//! Axis-aligned bounding box.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// An empty box (min = +inf, max = -inf) that absorbs any point.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Build the bounding box of an iterator of points.
    ///
    /// Returns the empty box if the iterator yields nothing.
    pub fn from_points<'a, I: IntoIterator<Item = &'a Point3<f64>>>(points: I) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.extend(p);
        }
        aabb
    }

    /// Grow the box to contain `point`.
    pub fn extend(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Whether the box contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the main diagonal; 0 for an empty box.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_empty() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!((aabb.diagonal()).abs() < f64::EPSILON);
    }

    #[test]
    fn from_points_bounds_all() {
        let points = [
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-3.0, 4.0, 2.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let aabb = Aabb::from_points(points.iter());

        assert!((aabb.min.x + 3.0).abs() < f64::EPSILON);
        assert!((aabb.min.y + 2.0).abs() < f64::EPSILON);
        assert!((aabb.min.z + 1.0).abs() < f64::EPSILON);
        assert!((aabb.max.x - 1.0).abs() < f64::EPSILON);
        assert!((aabb.max.y - 4.0).abs() < f64::EPSILON);
        assert!((aabb.max.z - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn diagonal_of_unit_box() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let aabb = Aabb::from_points(points.iter());
        assert!((aabb.diagonal() - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn center_of_symmetric_box() {
        let points = [Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)];
        let aabb = Aabb::from_points(points.iter());
        let c = aabb.center();
        assert!(c.x.abs() < f64::EPSILON);
        assert!(c.y.abs() < f64::EPSILON);
        assert!(c.z.abs() < f64::EPSILON);
    }
}
