//! A concrete triangle with vertex positions.

use nalgebra::{Point3, Vector3};

/// A triangle given by its three corner positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: Point3<f64>,
    /// Second corner.
    pub b: Point3<f64>,
    /// Third corner.
    pub c: Point3<f64>,
}

impl Triangle {
    /// Create a triangle from three corners.
    #[inline]
    #[must_use]
    pub const fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    /// Unit normal by the right-hand rule, or `None` for a degenerate
    /// triangle.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let cross = (self.b - self.a).cross(&(self.c - self.a));
        let len = cross.norm();
        if len < 1e-12 {
            None
        } else {
            Some(cross / len)
        }
    }

    /// Triangle area.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() * 0.5
    }

    /// Centroid of the three corners.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }
}
