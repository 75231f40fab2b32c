//! Connectivity artifact removal.
//!
//! Labels edge-connected face regions in a single union-find pass and
//! keeps only the regions large enough to be real anatomy; the small
//! ones are segmentation debris.

#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use tin_types::TriangleMesh;
use tracing::{debug, warn};

use crate::adjacency::ordered_edge;
use crate::error::{OptimizeError, OptimizeResult};

/// Statistics from the artifact removal stage.
#[derive(Debug, Clone, Copy)]
pub struct RegionStats {
    /// Regions kept.
    pub regions_kept: usize,
    /// Regions removed as artifacts.
    pub regions_removed: usize,
}

/// Remove edge-connected regions with fewer than `min_cells` faces.
///
/// All regions are labeled in one pass over the face list; surviving
/// regions are concatenated in their original face order.
///
/// # Errors
///
/// Returns [`OptimizeError::NoSurvivingGeometry`] when every region
/// falls below the threshold.
pub fn remove_artifacts(
    mesh: &TriangleMesh,
    min_cells: usize,
) -> OptimizeResult<(TriangleMesh, RegionStats)> {
    let face_count = mesh.face_count();
    let mut forest = UnionFind::new(face_count);

    // Union faces across shared edges; one traversal of the face list.
    let mut edge_owner: HashMap<(u32, u32), usize> = HashMap::new();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        for i in 0..3 {
            let edge = ordered_edge(face[i], face[(i + 1) % 3]);
            match edge_owner.get(&edge) {
                Some(&owner) => forest.union(owner, face_index),
                None => {
                    edge_owner.insert(edge, face_index);
                }
            }
        }
    }

    let mut region_sizes: HashMap<usize, usize> = HashMap::new();
    for face_index in 0..face_count {
        *region_sizes.entry(forest.find(face_index)).or_default() += 1;
    }
    let region_count = region_sizes.len();

    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(face_count);
    for (face_index, &face) in mesh.faces.iter().enumerate() {
        if region_sizes[&forest.find(face_index)] >= min_cells {
            faces.push(face);
        }
    }

    let regions_kept = region_sizes
        .values()
        .filter(|&&size| size >= min_cells)
        .count();
    let regions_removed = region_count - regions_kept;

    if regions_kept == 0 {
        warn!(
            region_count,
            min_cells, "all regions below artifact threshold"
        );
        return Err(OptimizeError::NoSurvivingGeometry {
            region_count,
            min_cells,
        });
    }

    // Compact points referenced by the surviving faces, keeping the
    // survivors in their original relative order.
    let mut used = vec![false; mesh.vertex_count()];
    for face in &faces {
        for &index in face {
            used[index as usize] = true;
        }
    }
    let mut new_index: Vec<u32> = vec![u32::MAX; mesh.vertex_count()];
    let mut positions = Vec::new();
    for (old, &is_used) in used.iter().enumerate() {
        if is_used {
            new_index[old] = positions.len() as u32;
            positions.push(mesh.positions[old]);
        }
    }
    for face in &mut faces {
        for index in face.iter_mut() {
            *index = new_index[*index as usize];
        }
    }

    debug!(
        regions_kept,
        regions_removed,
        faces_kept = faces.len(),
        "removed connectivity artifacts"
    );
    Ok((
        TriangleMesh::from_parts(positions, faces),
        RegionStats {
            regions_kept,
            regions_removed,
        },
    ))
}

/// Union-find with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
