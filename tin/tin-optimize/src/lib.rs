//! Surface mesh optimization for anatomical models.
//!
//! Raw isosurface meshes carry duplicated seam points, floating debris
//! from segmentation noise, far more triangles than needed, voxel
//! staircase artifacts, small holes and inconsistent winding. This
//! crate runs a fixed six-stage pass that turns such a mesh into a
//! clean model:
//!
//! 1. **Point merge** - weld points within [`OptimizeParams::merge_tolerance`]
//! 2. **Artifact removal** - drop edge-connected regions below
//!    [`OptimizeParams::artifact_min_cells`] faces
//! 3. **Decimation** - quadric edge collapse removing
//!    [`OptimizeParams::decimate_fraction`] of the faces
//! 4. **Laplacian smoothing** - [`OptimizeParams::smooth_iterations`]
//!    relaxation passes
//! 5. **Hole filling** - close boundary loops spanning at most
//!    [`OptimizeParams::hole_max_size`]
//! 6. **Normal unification** - consistent outward winding plus
//!    per-vertex normals
//!
//! # Example
//!
//! ```
//! use tin_optimize::{optimize, OptimizeParams};
//! use tin_types::unit_cube;
//!
//! let params = OptimizeParams::default().with_artifact_min_cells(1);
//! let outcome = optimize(&unit_cube(), &params).unwrap();
//! println!("{outcome}");
//! assert!(outcome.mesh.normals.is_some());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod decimate;
mod error;
mod holes;
mod merge;
mod normals;
mod outcome;
mod params;
mod quadric;
mod regions;
mod smooth;

pub use error::{OptimizeError, OptimizeResult};
pub use outcome::OptimizeOutcome;
pub use params::OptimizeParams;

use tracing::info;

/// Run the full six-stage optimization pass.
///
/// # Errors
///
/// - [`OptimizeError::EmptyMesh`] when the input has no faces.
/// - [`OptimizeError::NoSurvivingGeometry`] when artifact removal
///   discards every region.
/// - [`OptimizeError::HoleFillFailed`] when a fillable boundary loop
///   cannot be triangulated.
pub fn optimize(
    mesh: &tin_types::TriangleMesh,
    params: &OptimizeParams,
) -> OptimizeResult<OptimizeOutcome> {
    if mesh.is_empty() {
        return Err(OptimizeError::EmptyMesh);
    }

    let (merged, merge_stats) = merge::merge_points(mesh, params.merge_tolerance);
    if merged.is_empty() {
        return Err(OptimizeError::NoSurvivingGeometry {
            region_count: 0,
            min_cells: params.artifact_min_cells,
        });
    }

    let (cleaned, region_stats) = regions::remove_artifacts(&merged, params.artifact_min_cells)?;

    let (decimated, decimate_stats) = decimate::decimate(&cleaned, params.decimate_fraction);

    let mut result = smooth::smooth(
        &decimated,
        params.smooth_iterations,
        params.smooth_relaxation,
    );

    let hole_stats = holes::fill_holes(&mut result, params.hole_max_size)?;

    let normal_stats = normals::unify_normals(&mut result);

    let outcome = OptimizeOutcome {
        mesh: result,
        points_merged: merge_stats.points_merged,
        regions_kept: region_stats.regions_kept,
        regions_removed: region_stats.regions_removed,
        faces_before_decimation: decimate_stats.faces_before,
        faces_after_decimation: decimate_stats.faces_after,
        holes_filled: hole_stats.holes_filled,
        holes_skipped: hole_stats.holes_skipped,
        faces_reoriented: normal_stats.faces_reoriented,
    };
    info!(%outcome, "optimization pass complete");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tin_types::{unit_cube, Point3, TriangleMesh};

    fn permissive_params() -> OptimizeParams {
        // A cube survives artifact removal and keeps its shape.
        OptimizeParams::default()
            .with_artifact_min_cells(1)
            .with_decimate_fraction(0.0)
            .with_smoothing(0, 0.0)
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let result = optimize(&TriangleMesh::new(), &OptimizeParams::default());
        assert!(matches!(result, Err(OptimizeError::EmptyMesh)));
    }

    #[test]
    fn cube_passes_through_with_normals() {
        let outcome = optimize(&unit_cube(), &permissive_params()).unwrap();
        assert_eq!(outcome.mesh.face_count(), 12);
        assert!(outcome.mesh.normals.is_some());
        assert_relative_eq!(outcome.mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn debris_is_removed_before_decimation() {
        let mut mesh = unit_cube();
        let base = mesh.vertex_count() as u32;
        mesh.positions.push(Point3::new(100.0, 0.0, 0.0));
        mesh.positions.push(Point3::new(101.0, 0.0, 0.0));
        mesh.positions.push(Point3::new(100.0, 1.0, 0.0));
        mesh.faces.push([base, base + 1, base + 2]);

        let params = permissive_params().with_artifact_min_cells(5);
        let outcome = optimize(&mesh, &params).unwrap();
        assert_eq!(outcome.regions_removed, 1);
        assert_eq!(outcome.mesh.face_count(), 12);
    }

    #[test]
    fn all_debris_fails_the_mesh() {
        let mesh = TriangleMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let params = OptimizeParams::default().with_artifact_min_cells(50);
        let result = optimize(&mesh, &params);
        assert!(matches!(
            result,
            Err(OptimizeError::NoSurvivingGeometry { .. })
        ));
    }

    #[test]
    fn duplicated_seams_are_welded() {
        let mut cube = unit_cube();
        // Duplicate every vertex and rewrite half the faces onto the
        // duplicates, as an isosurface seam would.
        let copies: Vec<Point3<f64>> = cube.positions.clone();
        let offset = copies.len() as u32;
        cube.positions.extend(copies);
        for face in cube.faces.iter_mut().skip(6) {
            for index in face.iter_mut() {
                *index += offset;
            }
        }

        let outcome = optimize(&cube, &permissive_params()).unwrap();
        assert_eq!(outcome.points_merged, 8);
        assert_eq!(outcome.mesh.vertex_count(), 8);
    }

    #[test]
    fn outcome_reports_decimation_counts() {
        let params = permissive_params().with_decimate_fraction(0.5);
        let outcome = optimize(&unit_cube(), &params).unwrap();
        assert_eq!(outcome.faces_before_decimation, 12);
        assert_eq!(outcome.faces_after_decimation, outcome.mesh.face_count());
    }
}
