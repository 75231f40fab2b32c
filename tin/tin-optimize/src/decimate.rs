//! Edge-collapse decimation with quadric error metrics.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use tin_types::{Point3, TriangleMesh};
use tracing::debug;

use crate::adjacency::ordered_edge;
use crate::quadric::Quadric;

/// Decimation never reduces a region below this face count.
const MIN_FACES: usize = 4;

/// Statistics from the decimation stage.
#[derive(Debug, Clone, Copy)]
pub struct DecimateStats {
    /// Face count before decimation.
    pub faces_before: usize,
    /// Face count after decimation.
    pub faces_after: usize,
    /// Edge collapses performed.
    pub collapses: usize,
}

/// An edge collapse candidate in the priority queue.
#[derive(Debug, Clone)]
struct Candidate {
    v1: u32,
    v2: u32,
    cost: f64,
    target: Point3<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// Remove roughly `fraction` of the faces by collapsing the cheapest
/// edges first.
///
/// The target count is `ceil(faces * (1 - fraction))`, floored at a
/// non-degenerate minimum; the result is approximate since collapses
/// stop when no topology-preserving candidate remains. A fraction of
/// zero returns the mesh unchanged.
#[must_use]
pub fn decimate(mesh: &TriangleMesh, fraction: f64) -> (TriangleMesh, DecimateStats) {
    let faces_before = mesh.face_count();
    let target = ((faces_before as f64) * (1.0 - fraction)).ceil() as usize;
    let target = target.max(MIN_FACES);

    if fraction <= 0.0 || faces_before <= target {
        return (
            mesh.clone(),
            DecimateStats {
                faces_before,
                faces_after: faces_before,
                collapses: 0,
            },
        );
    }

    let mut positions: Vec<Option<Point3<f64>>> =
        mesh.positions.iter().copied().map(Some).collect();
    let mut faces: Vec<Option<[u32; 3]>> = mesh.faces.iter().copied().map(Some).collect();
    let mut active_faces = faces_before;

    let mut quadrics = vertex_quadrics(mesh);
    let mut remap: HashMap<u32, u32> = HashMap::new();

    let mut heap = BinaryHeap::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    for face in &mesh.faces {
        for i in 0..3 {
            let edge = ordered_edge(face[i], face[(i + 1) % 3]);
            if seen.insert(edge) {
                heap.push(candidate(edge.0, edge.1, &positions, &quadrics));
            }
        }
    }

    let mut collapses = 0;
    while active_faces > target {
        let Some(collapse) = heap.pop() else {
            break;
        };

        let v1 = resolve(collapse.v1, &remap);
        let v2 = resolve(collapse.v2, &remap);
        if v1 == v2 || positions[v1 as usize].is_none() || positions[v2 as usize].is_none() {
            continue;
        }
        if !collapse_preserves_topology(&faces, v1, v2) {
            continue;
        }

        positions[v1 as usize] = Some(collapse.target);
        positions[v2 as usize] = None;
        let q2 = quadrics[v2 as usize];
        quadrics[v1 as usize].add(&q2);
        remap.insert(v2, v1);

        for face_slot in &mut faces {
            if let Some(face) = face_slot {
                for index in face.iter_mut() {
                    *index = resolve(*index, &remap);
                }
                if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                    *face_slot = None;
                    active_faces -= 1;
                }
            }
        }
        collapses += 1;

        // Refresh candidates around the merged vertex.
        for face in faces.iter().flatten() {
            if face.contains(&v1) {
                for &v in face {
                    if v != v1 && positions[v as usize].is_some() {
                        heap.push(candidate(v1, v, &positions, &quadrics));
                    }
                }
            }
        }
    }

    let decimated = compact(&positions, &faces);
    debug!(
        faces_before,
        faces_after = decimated.face_count(),
        collapses,
        "decimated mesh"
    );
    let stats = DecimateStats {
        faces_before,
        faces_after: decimated.face_count(),
        collapses,
    };
    (decimated, stats)
}

fn vertex_quadrics(mesh: &TriangleMesh) -> Vec<Quadric> {
    let mut quadrics = vec![Quadric::default(); mesh.vertex_count()];
    for (face, triangle) in mesh.faces.iter().zip(mesh.triangles()) {
        let Some(normal) = triangle.normal() else {
            continue;
        };
        let d = -normal.dot(&triangle.a.coords);
        let q = Quadric::from_plane(normal, d);
        for &v in face {
            quadrics[v as usize].add(&q);
        }
    }
    quadrics
}

fn candidate(v1: u32, v2: u32, positions: &[Option<Point3<f64>>], quadrics: &[Quadric]) -> Candidate {
    let mut combined = quadrics[v1 as usize];
    combined.add(&quadrics[v2 as usize]);

    let p1 = positions[v1 as usize].unwrap_or_else(Point3::origin);
    let p2 = positions[v2 as usize].unwrap_or_else(Point3::origin);
    let midpoint = nalgebra::center(&p1, &p2);
    let target = combined.minimizer().unwrap_or(midpoint);

    Candidate {
        v1,
        v2,
        cost: combined.evaluate(target),
        target,
    }
}

fn resolve(mut v: u32, remap: &HashMap<u32, u32>) -> u32 {
    while let Some(&next) = remap.get(&v) {
        v = next;
    }
    v
}

/// Link condition: a collapse keeps the surface manifold only when the
/// endpoints share at most the two vertices opposite the edge.
fn collapse_preserves_topology(faces: &[Option<[u32; 3]>], v1: u32, v2: u32) -> bool {
    let mut n1: HashSet<u32> = HashSet::new();
    let mut n2: HashSet<u32> = HashSet::new();
    for face in faces.iter().flatten() {
        if face.contains(&v1) {
            n1.extend(face.iter().copied().filter(|&v| v != v1 && v != v2));
        }
        if face.contains(&v2) {
            n2.extend(face.iter().copied().filter(|&v| v != v1 && v != v2));
        }
    }
    n1.intersection(&n2).count() <= 2
}

fn compact(positions: &[Option<Point3<f64>>], faces: &[Option<[u32; 3]>]) -> TriangleMesh {
    let mut new_index: HashMap<u32, u32> = HashMap::new();
    let mut mesh = TriangleMesh::new();
    for face in faces.iter().flatten() {
        let mut remapped = [0u32; 3];
        for (slot, &old) in remapped.iter_mut().zip(face) {
            *slot = match new_index.get(&old) {
                Some(&index) => index,
                None => {
                    let index = mesh.positions.len() as u32;
                    // Surviving faces reference only live vertices.
                    let Some(p) = positions[old as usize] else {
                        continue;
                    };
                    mesh.positions.push(p);
                    new_index.insert(old, index);
                    index
                }
            };
        }
        mesh.faces.push(remapped);
    }
    mesh
}
