//! Laplacian mesh smoothing.

#![allow(clippy::cast_precision_loss)]

use tin_types::{Point3, TriangleMesh, Vector3};
use tracing::debug;

use crate::adjacency::vertex_neighbors;

/// Relax each vertex toward the centroid of its edge neighbors.
///
/// Runs `iterations` passes; per pass every vertex moves
/// `relaxation * (centroid - v)`. Connectivity is untouched and there
/// is no feature preservation, so the surface shrinks slightly. Zero
/// iterations or zero relaxation leave every position identical.
#[must_use]
pub fn smooth(mesh: &TriangleMesh, iterations: usize, relaxation: f64) -> TriangleMesh {
    let mut result = mesh.clone();
    if iterations == 0 || relaxation == 0.0 || mesh.is_empty() {
        return result;
    }

    let neighbors = vertex_neighbors(&mesh.faces, mesh.vertex_count());
    let mut next: Vec<Point3<f64>> = result.positions.clone();

    for _ in 0..iterations {
        for (index, position) in result.positions.iter().enumerate() {
            let adjacent = &neighbors[index];
            if adjacent.is_empty() {
                next[index] = *position;
                continue;
            }
            let mut centroid = Vector3::zeros();
            for &n in adjacent {
                centroid += result.positions[n as usize].coords;
            }
            centroid /= adjacent.len() as f64;
            next[index] = position + relaxation * (centroid - position.coords);
        }
        std::mem::swap(&mut result.positions, &mut next);
    }

    debug!(iterations, relaxation, "smoothed mesh");
    result
}
