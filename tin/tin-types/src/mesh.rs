//! Indexed triangle mesh.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Triangle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle surface (TIN).
///
/// Positions and faces are stored separately; faces reference positions
/// by `u32` index. Per-vertex normals are optional: a raw isosurface
/// mesh carries none, the optimizer attaches them in its final stage.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Triangle faces as position indices, CCW from outside.
    pub faces: Vec<[u32; 3]>,
    /// Optional per-vertex unit normals, parallel to `positions`.
    pub normals: Option<Vec<Vector3<f64>>>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            normals: None,
        }
    }

    /// Create a mesh from positions and faces, without normals.
    #[inline]
    #[must_use]
    pub const fn from_parts(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            normals: None,
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangle faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The triangle of face `index`, or `None` if out of range.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        self.faces.get(index).map(|&[i0, i1, i2]| {
            Triangle::new(
                self.positions[i0 as usize],
                self.positions[i1 as usize],
                self.positions[i2 as usize],
            )
        })
    }

    /// Iterate over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| {
            Triangle::new(
                self.positions[i0 as usize],
                self.positions[i1 as usize],
                self.positions[i2 as usize],
            )
        })
    }

    /// Axis-aligned bounding box of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing normals, negative
    /// for an inside-out mesh; not meaningful for open surfaces.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for &[i0, i1, i2] in &self.faces {
            let a = self.positions[i0 as usize].coords;
            let b = self.positions[i1 as usize].coords;
            let c = self.positions[i2 as usize].coords;
            volume += a.dot(&b.cross(&c));
        }
        volume / 6.0
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Reverse the winding of every face, and negate normals if present.
    pub fn flip_orientation(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals.iter_mut() {
                *n = -*n;
            }
        }
    }

    /// Drop per-vertex normals.
    pub fn clear_normals(&mut self) {
        self.normals = None;
    }

    /// Append another mesh, offsetting its face indices.
    #[allow(clippy::cast_possible_truncation)]
    // Vertex counts beyond u32 are unsupported by the index type.
    pub fn append(&mut self, other: &Self) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|&[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        // Normals cannot be kept consistent across an append.
        self.normals = None;
    }
}

/// A closed unit cube from (0,0,0) to (1,1,1), CCW from outside.
///
/// Test helper used across the workspace.
#[must_use]
pub fn unit_cube() -> TriangleMesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2], // bottom
        [4, 5, 6],
        [4, 6, 7], // top
        [0, 1, 5],
        [0, 5, 4], // front
        [3, 7, 6],
        [3, 6, 2], // back
        [0, 4, 7],
        [0, 7, 3], // left
        [1, 2, 6],
        [1, 6, 5], // right
    ];
    TriangleMesh::from_parts(positions, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_mesh() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.bounds().is_empty());
    }

    #[test]
    fn unit_cube_volume_and_area() {
        let cube = unit_cube();
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn flip_makes_volume_negative() {
        let mut cube = unit_cube();
        cube.flip_orientation();
        assert_relative_eq!(cube.signed_volume(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn flip_negates_normals() {
        let mut mesh = unit_cube();
        mesh.normals = Some(vec![Vector3::z(); mesh.vertex_count()]);
        mesh.flip_orientation();
        let normals = mesh.normals.unwrap();
        assert_relative_eq!(normals[0].z, -1.0);
    }

    #[test]
    fn append_offsets_indices() {
        let mut mesh = unit_cube();
        let other = unit_cube();
        mesh.append(&other);

        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.faces[12], [8, 10, 9]);
    }

    #[test]
    fn triangle_accessor() {
        let cube = unit_cube();
        assert!(cube.triangle(0).is_some());
        assert!(cube.triangle(100).is_none());
    }

    #[test]
    fn bounds_of_cube() {
        let cube = unit_cube();
        let bounds = cube.bounds();
        assert_relative_eq!(bounds.min.x, 0.0);
        assert_relative_eq!(bounds.max.z, 1.0);
        assert_relative_eq!(bounds.diagonal(), 3.0_f64.sqrt(), epsilon = 1e-12);
    }
}
