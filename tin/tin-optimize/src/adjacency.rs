//! Edge and vertex adjacency for a face list.

use hashbrown::HashMap;

/// Edge-to-face adjacency over a triangle face list.
///
/// Built once per stage that needs connectivity; faces are referenced
/// by their index in the list the adjacency was built from.
#[derive(Debug)]
pub struct EdgeAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
}

impl EdgeAdjacency {
    /// Build adjacency from a triangle face list.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face_index, face) in faces.iter().enumerate() {
            for i in 0..3 {
                let edge = ordered_edge(face[i], face[(i + 1) % 3]);
                edge_to_faces.entry(edge).or_default().push(face_index);
            }
        }
        Self { edge_to_faces }
    }

    /// Faces sharing the edge `(a, b)`, in either direction.
    #[must_use]
    pub fn faces_for_edge(&self, a: u32, b: u32) -> &[usize] {
        self.edge_to_faces
            .get(&ordered_edge(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// Iterate over boundary edges (exactly one adjacent face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Whether no edge has fewer than two adjacent faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Iterate over `(edge, face indices)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), &[usize])> + '_ {
        self.edge_to_faces
            .iter()
            .map(|(&edge, faces)| (edge, faces.as_slice()))
    }
}

/// Vertex neighbor sets for Laplacian smoothing.
#[must_use]
pub fn vertex_neighbors(faces: &[[u32; 3]], vertex_count: usize) -> Vec<Vec<u32>> {
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
    for face in faces {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            if !neighbors[a as usize].contains(&b) {
                neighbors[a as usize].push(b);
            }
            if !neighbors[b as usize].contains(&a) {
                neighbors[b as usize].push(a);
            }
        }
    }
    neighbors
}

/// Canonical edge with the smaller index first.
#[inline]
pub const fn ordered_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
