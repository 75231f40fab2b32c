//! Quadric error metric for edge collapse.

use tin_types::{Point3, Vector3};

/// Sum of squared distances to a set of planes.
///
/// Stored as `Q(v) = v'Av + 2b·v + c` where each plane `n·v + d = 0`
/// (unit normal) contributes `A = nn'`, `b = dn`, `c = d²`.
#[derive(Debug, Clone, Copy)]
pub struct Quadric {
    a: nalgebra::Matrix3<f64>,
    b: Vector3<f64>,
    c: f64,
}

impl Default for Quadric {
    fn default() -> Self {
        Self {
            a: nalgebra::Matrix3::zeros(),
            b: Vector3::zeros(),
            c: 0.0,
        }
    }
}

impl Quadric {
    /// Quadric of a single plane with unit normal `n` and offset `d`.
    #[must_use]
    pub fn from_plane(n: Vector3<f64>, d: f64) -> Self {
        Self {
            a: n * n.transpose(),
            b: d * n,
            c: d * d,
        }
    }

    /// Accumulate another quadric.
    pub fn add(&mut self, other: &Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }

    /// Squared-distance error of `point`.
    #[must_use]
    pub fn evaluate(&self, point: Point3<f64>) -> f64 {
        let v = point.coords;
        (v.transpose() * self.a * v)[0] + 2.0 * self.b.dot(&v) + self.c
    }

    /// The point minimizing the error, or `None` when the plane set is
    /// degenerate (flat or linear neighborhoods).
    #[must_use]
    pub fn minimizer(&self) -> Option<Point3<f64>> {
        if self.a.determinant().abs() < 1e-10 {
            return None;
        }
        self.a
            .try_inverse()
            .map(|inverse| Point3::from(inverse * -self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_quadric_has_zero_error() {
        let q = Quadric::default();
        assert_relative_eq!(q.evaluate(Point3::new(1.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn plane_error_is_squared_distance() {
        // Plane z = 1: normal (0, 0, 1), d = -1.
        let q = Quadric::from_plane(Vector3::z(), -1.0);
        assert_relative_eq!(q.evaluate(Point3::new(5.0, -3.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.evaluate(Point3::new(0.0, 0.0, 3.0)), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn minimizer_of_three_planes_is_their_intersection() {
        let mut q = Quadric::from_plane(Vector3::x(), -1.0);
        q.add(&Quadric::from_plane(Vector3::y(), -2.0));
        q.add(&Quadric::from_plane(Vector3::z(), -3.0));

        let p = q.minimizer().unwrap();
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn single_plane_has_no_unique_minimizer() {
        let q = Quadric::from_plane(Vector3::z(), 0.0);
        assert!(q.minimizer().is_none());
    }
}
