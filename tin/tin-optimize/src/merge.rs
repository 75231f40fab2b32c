//! Point merge (vertex welding) within a spatial tolerance.

#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use tin_types::TriangleMesh;
use tracing::debug;

/// Statistics from the merge stage.
#[derive(Debug, Clone, Copy)]
pub struct MergeStats {
    /// Points removed by welding or as unreferenced.
    pub points_merged: usize,
    /// Faces that became degenerate and were dropped.
    pub faces_dropped: usize,
}

/// Merge points closer than `tolerance` and drop the degenerate faces
/// and unreferenced points this produces.
///
/// Each point is welded to the first earlier point within `tolerance`
/// (spatial hash grid, first-come representative). A tolerance of zero
/// merges exactly coincident points only.
#[must_use]
pub fn merge_points(mesh: &TriangleMesh, tolerance: f64) -> (TriangleMesh, MergeStats) {
    let original_points = mesh.vertex_count();

    // Cell edge equals the tolerance so candidates are confined to the
    // 27 surrounding cells.
    let cell_size = tolerance.max(1e-12);
    let cell_of = |v: f64| (v / cell_size).floor() as i64;

    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    // Maps each original point to its representative.
    let mut representative: Vec<u32> = Vec::with_capacity(original_points);

    for (index, p) in mesh.positions.iter().enumerate() {
        let cell = (cell_of(p.x), cell_of(p.y), cell_of(p.z));
        let mut found = None;
        'search: for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let key = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(candidates) = grid.get(&key) else {
                        continue;
                    };
                    for &candidate in candidates {
                        let q = mesh.positions[candidate as usize];
                        if (p - q).norm() <= tolerance {
                            found = Some(candidate);
                            break 'search;
                        }
                    }
                }
            }
        }

        match found {
            Some(rep) => representative.push(rep),
            None => {
                let rep = index as u32;
                grid.entry(cell).or_default().push(rep);
                representative.push(rep);
            }
        }
    }

    // Remap faces and drop the ones merging made degenerate.
    let mut faces_dropped = 0;
    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(mesh.faces.len());
    for &[a, b, c] in &mesh.faces {
        let face = [
            representative[a as usize],
            representative[b as usize],
            representative[c as usize],
        ];
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            faces_dropped += 1;
        } else {
            faces.push(face);
        }
    }

    // Compact: keep only points still referenced by a face.
    let mut new_index: Vec<u32> = vec![u32::MAX; original_points];
    let mut positions = Vec::new();
    for face in &mut faces {
        for index in face.iter_mut() {
            let slot = &mut new_index[*index as usize];
            if *slot == u32::MAX {
                *slot = positions.len() as u32;
                positions.push(mesh.positions[*index as usize]);
            }
            *index = *slot;
        }
    }

    let merged = TriangleMesh::from_parts(positions, faces);
    let stats = MergeStats {
        points_merged: original_points - merged.vertex_count(),
        faces_dropped,
    };
    debug!(
        points_before = original_points,
        points_after = merged.vertex_count(),
        faces_dropped,
        tolerance,
        "merged points"
    );
    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tin_types::{unit_cube, Point3};

    /// Two triangles sharing an edge geometrically but not by index.
    fn duplicated_seam() -> TriangleMesh {
        TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                // Duplicates of points 1 and 2.
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 5, 4]],
        )
    }

    #[test]
    fn coincident_points_are_welded() {
        let mesh = duplicated_seam();
        let (merged, stats) = merge_points(&mesh, 1e-6);

        assert_eq!(merged.vertex_count(), 4);
        assert_eq!(merged.face_count(), 2);
        assert_eq!(stats.points_merged, 2);
        assert_eq!(stats.faces_dropped, 0);
    }

    #[test]
    fn zero_tolerance_welds_exact_duplicates() {
        let mesh = duplicated_seam();
        let (merged, _) = merge_points(&mesh, 0.0);
        assert_eq!(merged.vertex_count(), 4);
    }

    #[test]
    fn nearby_points_weld_within_tolerance() {
        let mut mesh = duplicated_seam();
        // Perturb one duplicate slightly.
        mesh.positions[3] = Point3::new(1.0 + 1e-5, 0.0, 0.0);

        let (strict, _) = merge_points(&mesh, 1e-6);
        assert_eq!(strict.vertex_count(), 5);

        let (loose, _) = merge_points(&mesh, 1e-4);
        assert_eq!(loose.vertex_count(), 4);
    }

    #[test]
    fn collapsed_triangle_is_dropped() {
        let mesh = TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1e-6, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let (merged, stats) = merge_points(&mesh, 1e-3);
        assert!(merged.is_empty());
        assert_eq!(stats.faces_dropped, 1);
    }

    #[test]
    fn clean_mesh_is_unchanged() {
        let cube = unit_cube();
        let (merged, stats) = merge_points(&cube, 1e-6);
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(merged.face_count(), 12);
        assert_eq!(stats.points_merged, 0);
        assert_relative_eq!(merged.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn unreferenced_points_are_dropped() {
        let mut mesh = unit_cube();
        mesh.positions.push(Point3::new(50.0, 50.0, 50.0));
        let (merged, stats) = merge_points(&mesh, 1e-6);
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(stats.points_merged, 1);
    }
}
