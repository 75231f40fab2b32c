//! Orientation unification and per-vertex normals.

use std::collections::VecDeque;

use tin_types::{TriangleMesh, Vector3};
use tracing::debug;

use crate::adjacency::EdgeAdjacency;

/// Statistics from the normal unification stage.
#[derive(Debug, Clone, Copy)]
pub struct NormalStats {
    /// Faces whose winding was flipped.
    pub faces_reoriented: usize,
}

/// Unify face orientation and attach per-vertex normals.
///
/// Orientation is propagated from an arbitrary seed face across shared
/// manifold edges, flipping faces whose winding disagrees with their
/// neighbor. When the resulting signed volume is negative the whole
/// mesh is flipped so normals point outward. Positions and
/// connectivity (up to winding) are unchanged, so applying this twice
/// is a fixed point.
#[must_use]
pub fn unify_normals(mesh: &mut TriangleMesh) -> NormalStats {
    let flipped = unify_orientation(mesh);

    // Outward heuristic: a closed, consistently wound surface bounding
    // an interior has positive signed volume.
    if mesh.signed_volume() < 0.0 {
        mesh.flip_orientation();
    }

    attach_vertex_normals(mesh);

    debug!(faces_reoriented = flipped, "unified mesh orientation");
    NormalStats {
        faces_reoriented: flipped,
    }
}

/// Make winding consistent across every edge-connected region.
///
/// Returns the number of faces flipped.
fn unify_orientation(mesh: &mut TriangleMesh) -> usize {
    let adjacency = EdgeAdjacency::build(&mesh.faces);
    let face_count = mesh.face_count();
    let mut visited = vec![false; face_count];
    let mut flipped = 0;

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut queue = VecDeque::from([seed]);

        while let Some(face_index) = queue.pop_front() {
            let face = mesh.faces[face_index];
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let shared = adjacency.faces_for_edge(a, b);
                // Orientation only propagates across manifold edges.
                if shared.len() != 2 {
                    continue;
                }
                for &neighbor in shared {
                    if neighbor == face_index || visited[neighbor] {
                        continue;
                    }
                    // Consistent winding traverses a shared edge in
                    // opposite directions.
                    if edge_direction(&mesh.faces[neighbor], a, b) {
                        mesh.faces[neighbor].swap(1, 2);
                        flipped += 1;
                    }
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    flipped
}

/// Whether `face` contains the directed edge `a -> b`.
fn edge_direction(face: &[u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|i| face[i] == a && face[(i + 1) % 3] == b)
}

/// Attach area-weighted per-vertex normals.
fn attach_vertex_normals(mesh: &mut TriangleMesh) {
    let mut normals = vec![Vector3::zeros(); mesh.vertex_count()];
    for (face, triangle) in mesh.faces.iter().zip(mesh.triangles()) {
        // Cross product length carries the area weight.
        let weighted = (triangle.b - triangle.a).cross(&(triangle.c - triangle.a));
        for &v in face {
            normals[v as usize] += weighted;
        }
    }
    for n in &mut normals {
        let len = n.norm();
        if len > f64::EPSILON {
            *n /= len;
        }
    }
    mesh.normals = Some(normals);
}
