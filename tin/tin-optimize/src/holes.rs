//! Boundary loop detection and hole filling.
//!
//! A hole is a closed loop of boundary edges (edges with exactly one
//! adjacent face). Loops whose spatial span stays within the limit are
//! triangulated shut; larger openings are left alone since they are
//! usually where a vessel was clipped by the scan boundary.

use hashbrown::{HashMap, HashSet};
use tin_types::{Point3, Triangle, TriangleMesh, Vector3};
use tracing::{debug, warn};

use crate::adjacency::EdgeAdjacency;
use crate::error::{OptimizeError, OptimizeResult};

/// Statistics from the hole filling stage.
#[derive(Debug, Clone, Copy)]
pub struct HoleStats {
    /// Loops filled.
    pub holes_filled: usize,
    /// Loops left open because their span exceeded the limit.
    pub holes_skipped: usize,
}

/// An ordered closed loop of boundary vertices.
#[derive(Debug, Clone)]
struct BoundaryLoop {
    vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Largest pairwise distance between loop vertices.
    fn span(&self, positions: &[Point3<f64>]) -> f64 {
        let mut span: f64 = 0.0;
        for (i, &a) in self.vertices.iter().enumerate() {
            for &b in &self.vertices[i + 1..] {
                span = span.max((positions[a as usize] - positions[b as usize]).norm());
            }
        }
        span
    }
}

/// Fill every boundary loop whose span is at most `max_size`.
///
/// New faces are appended to the mesh; positions are untouched.
///
/// # Errors
///
/// Returns [`OptimizeError::HoleFillFailed`] if a fillable loop cannot
/// be triangulated.
pub fn fill_holes(mesh: &mut TriangleMesh, max_size: f64) -> OptimizeResult<HoleStats> {
    let adjacency = EdgeAdjacency::build(&mesh.faces);
    let loops = trace_boundary_loops(&adjacency);

    let mut stats = HoleStats {
        holes_filled: 0,
        holes_skipped: 0,
    };
    for boundary in &loops {
        let span = boundary.span(&mesh.positions);
        if span > max_size {
            warn!(
                edges = boundary.vertices.len(),
                span, max_size, "leaving large hole open"
            );
            stats.holes_skipped += 1;
            continue;
        }

        let triangles = triangulate_loop(&mesh.positions, &boundary.vertices);
        if triangles.is_empty() {
            return Err(OptimizeError::HoleFillFailed {
                reason: format!(
                    "could not triangulate a {}-edge loop of span {span:.3}",
                    boundary.vertices.len()
                ),
            });
        }
        mesh.faces.extend(triangles);
        stats.holes_filled += 1;
    }

    if stats.holes_filled > 0 || stats.holes_skipped > 0 {
        debug!(
            filled = stats.holes_filled,
            skipped = stats.holes_skipped,
            "processed boundary loops"
        );
    }
    Ok(stats)
}

/// Trace boundary edges into closed vertex loops.
fn trace_boundary_loops(adjacency: &EdgeAdjacency) -> Vec<BoundaryLoop> {
    let boundary_edges: Vec<(u32, u32)> = adjacency.boundary_edges().collect();
    if boundary_edges.is_empty() {
        return Vec::new();
    }

    let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(a, b) in &boundary_edges {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    let mut visited: HashSet<u32> = HashSet::new();
    let mut loops = Vec::new();

    for &(start, _) in &boundary_edges {
        if visited.contains(&start) {
            continue;
        }

        let mut vertices = Vec::new();
        let mut current = start;
        let mut previous: Option<u32> = None;

        loop {
            visited.insert(current);
            vertices.push(current);

            let candidates = neighbors.get(&current).map_or(&[][..], Vec::as_slice);
            let next = candidates
                .iter()
                .find(|&&n| Some(n) != previous && !visited.contains(&n))
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|&&n| n == start && vertices.len() > 2)
                });

            match next {
                Some(&n) if n == start => break,
                Some(&n) => {
                    previous = Some(current);
                    current = n;
                }
                None => {
                    warn!(start, "boundary loop did not close");
                    vertices.clear();
                    break;
                }
            }
        }

        if vertices.len() >= 3 {
            loops.push(BoundaryLoop { vertices });
        }
    }

    loops
}

/// Ear-clip a boundary loop, falling back to a fan when stuck.
fn triangulate_loop(positions: &[Point3<f64>], boundary: &[u32]) -> Vec<[u32; 3]> {
    let n = boundary.len();
    if n < 3 {
        return Vec::new();
    }

    let loop_positions: Vec<Point3<f64>> = boundary
        .iter()
        .map(|&v| positions[v as usize])
        .collect();
    let normal = loop_normal(&loop_positions);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::new();

    while remaining.len() > 3 {
        let mut clipped = false;
        for i in 0..remaining.len() {
            let prev = remaining[(i + remaining.len() - 1) % remaining.len()];
            let curr = remaining[i];
            let next = remaining[(i + 1) % remaining.len()];

            if is_ear(&loop_positions, &remaining, prev, curr, next, &normal) {
                triangles.push([boundary[prev], boundary[curr], boundary[next]]);
                remaining.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            break;
        }
    }

    if remaining.len() == 3 {
        triangles.push([
            boundary[remaining[0]],
            boundary[remaining[1]],
            boundary[remaining[2]],
        ]);
    } else {
        // Fan fallback for the vertices ear clipping left behind.
        for i in 1..remaining.len() - 1 {
            triangles.push([
                boundary[remaining[0]],
                boundary[remaining[i]],
                boundary[remaining[i + 1]],
            ]);
        }
    }

    triangles
}

/// Average normal of the loop polygon around its centroid.
#[allow(clippy::cast_precision_loss)]
fn loop_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    let n = positions.len();
    let centroid = positions
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords)
        / n as f64;

    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = positions[i].coords - centroid;
        let b = positions[(i + 1) % n].coords - centroid;
        normal += a.cross(&b);
    }
    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::z()
    }
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    normal: &Vector3<f64>,
) -> bool {
    let triangle = Triangle::new(positions[prev], positions[curr], positions[next]);
    let Some(tri_normal) = triangle.normal() else {
        return false;
    };
    if tri_normal.dot(normal) < 0.0 {
        return false;
    }
    for &other in remaining {
        if other == prev || other == curr || other == next {
            continue;
        }
        if point_in_triangle(
            positions[other],
            positions[prev],
            positions[curr],
            positions[next],
            normal,
        ) {
            return false;
        }
    }
    true
}

/// Point-in-triangle test after projecting out the dominant normal axis.
fn point_in_triangle(
    p: Point3<f64>,
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let (ax, ay) = dominant_axes(normal);
    let project = |q: Point3<f64>| (q.coords[ax], q.coords[ay]);
    let (p2, a2, b2, c2) = (project(p), project(a), project(b), project(c));

    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };
    let d1 = sign(p2, a2, b2);
    let d2 = sign(p2, b2, c2);
    let d3 = sign(p2, c2, a2);

    let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_negative && has_positive)
}

/// The two coordinate axes least aligned with the normal.
fn dominant_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let abs = normal.abs();
    if abs.z >= abs.x && abs.z >= abs.y {
        (0, 1)
    } else if abs.y >= abs.x {
        (0, 2)
    } else {
        (1, 2)
    }
}
