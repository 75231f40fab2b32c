//! Surface-nets contouring of a scalar grid.

use tin_types::{Point3, TriangleMesh};
use tracing::debug;
use volume_types::ScalarVolume;

use crate::{IsosurfaceError, IsosurfaceResult};

/// Offsets of the eight corners of a cell, x-fastest.
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// The twelve cell edges as corner index pairs.
const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Extract the isosurface of `volume` at `iso`.
///
/// Voxels with value above `iso` are considered inside. Returns an
/// empty mesh when no cell straddles the level set.
///
/// # Errors
///
/// Returns [`IsosurfaceError::VolumeTooSmall`] if any dimension is
/// below 2, since such a grid has no cells.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn extract_isosurface(volume: &ScalarVolume, iso: f64) -> IsosurfaceResult<TriangleMesh> {
    let [nx, ny, nz] = volume.dims();
    if nx < 2 || ny < 2 || nz < 2 {
        return Err(IsosurfaceError::VolumeTooSmall {
            dims: volume.dims(),
        });
    }

    let cells = [nx - 1, ny - 1, nz - 1];
    let cell_index = |x: usize, y: usize, z: usize| x + y * cells[0] + z * cells[0] * cells[1];

    // One vertex per straddling cell; u32::MAX marks an inactive cell.
    let mut cell_vertex = vec![u32::MAX; cells[0] * cells[1] * cells[2]];
    let mut mesh = TriangleMesh::new();

    for z in 0..cells[2] {
        for y in 0..cells[1] {
            for x in 0..cells[0] {
                let mut values = [0.0f64; 8];
                let mut inside_mask = 0u8;
                for (i, [dx, dy, dz]) in CORNERS.iter().enumerate() {
                    let v = f64::from(volume.get(x + dx, y + dy, z + dz)) - iso;
                    values[i] = v;
                    if v > 0.0 {
                        inside_mask |= 1 << i;
                    }
                }
                if inside_mask == 0 || inside_mask == 0xff {
                    continue;
                }

                if let Some(local) = cell_vertex_position(&values) {
                    let world = Point3::new(
                        volume.origin[0] + (x as f64 + local[0]) * volume.spacing[0],
                        volume.origin[1] + (y as f64 + local[1]) * volume.spacing[1],
                        volume.origin[2] + (z as f64 + local[2]) * volume.spacing[2],
                    );
                    cell_vertex[cell_index(x, y, z)] = mesh.positions.len() as u32;
                    mesh.positions.push(world);
                }
            }
        }
    }

    // Quads around sign-changing voxel edges. The edge along axis `a`
    // at voxel (x, y, z) is shared by the four cells offset by -1/0
    // along the other two axes.
    let value_at = |x: usize, y: usize, z: usize| f64::from(volume.get(x, y, z)) - iso;
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let here_inside = value_at(x, y, z) > 0.0;
                for axis in 0..3 {
                    let mut n = [x, y, z];
                    n[axis] += 1;
                    if n[0] >= nx || n[1] >= ny || n[2] >= nz {
                        continue;
                    }
                    let there_inside = value_at(n[0], n[1], n[2]) > 0.0;
                    if here_inside == there_inside {
                        continue;
                    }

                    let b = (axis + 1) % 3;
                    let c = (axis + 2) % 3;
                    let base = [x, y, z];
                    // All four cells around the edge must exist.
                    if base[b] == 0 || base[c] == 0 {
                        continue;
                    }
                    let mut quad = [0u32; 4];
                    let mut missing = false;
                    // Cyclic (b, c) offsets giving an outward normal
                    // along +axis when the lower voxel is inside.
                    for (slot, (db, dc)) in [(1usize, 1usize), (0, 1), (0, 0), (1, 0)]
                        .into_iter()
                        .enumerate()
                    {
                        let mut cell = base;
                        cell[b] -= db;
                        cell[c] -= dc;
                        if cell[0] >= cells[0] || cell[1] >= cells[1] || cell[2] >= cells[2] {
                            missing = true;
                            break;
                        }
                        let v = cell_vertex[cell_index(cell[0], cell[1], cell[2])];
                        if v == u32::MAX {
                            missing = true;
                            break;
                        }
                        quad[slot] = v;
                    }
                    if missing {
                        continue;
                    }

                    let [q0, q1, q2, q3] = quad;
                    if here_inside {
                        mesh.faces.push([q0, q1, q2]);
                        mesh.faces.push([q0, q2, q3]);
                    } else {
                        mesh.faces.push([q0, q2, q1]);
                        mesh.faces.push([q0, q3, q2]);
                    }
                }
            }
        }
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        iso,
        "contoured volume"
    );
    Ok(mesh)
}

/// Cell-local vertex position as the mean of the edge crossings, or
/// `None` if no edge straddles the level set.
#[allow(clippy::cast_precision_loss)]
fn cell_vertex_position(values: &[f64; 8]) -> Option<[f64; 3]> {
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for [e0, e1] in EDGES {
        let v0 = values[e0];
        let v1 = values[e1];
        if (v0 > 0.0) == (v1 > 0.0) {
            continue;
        }
        let t = v0 / (v0 - v1);
        for axis in 0..3 {
            let p0 = CORNERS[e0][axis] as f64;
            let p1 = CORNERS[e1][axis] as f64;
            sum[axis] += p0 + t * (p1 - p0);
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some([sum[0] / n, sum[1] / n, sum[2] / n])
}
