//! Outcome of an optimization pass.

#![allow(clippy::cast_precision_loss)]

use tin_types::TriangleMesh;

/// The optimized mesh plus per-stage statistics.
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    /// The optimized mesh, with per-vertex normals attached.
    pub mesh: TriangleMesh,

    /// Number of points removed by the merge stage.
    pub points_merged: usize,

    /// Connected regions kept after artifact removal.
    pub regions_kept: usize,

    /// Connected regions removed as artifacts.
    pub regions_removed: usize,

    /// Face count before decimation.
    pub faces_before_decimation: usize,

    /// Face count after decimation.
    pub faces_after_decimation: usize,

    /// Boundary loops filled.
    pub holes_filled: usize,

    /// Boundary loops left open (span above the limit).
    pub holes_skipped: usize,

    /// Faces flipped during orientation unification.
    pub faces_reoriented: usize,
}

impl OptimizeOutcome {
    /// Fraction of faces removed by decimation.
    #[must_use]
    pub fn decimation_reduction(&self) -> f64 {
        if self.faces_before_decimation == 0 {
            0.0
        } else {
            1.0 - self.faces_after_decimation as f64 / self.faces_before_decimation as f64
        }
    }
}

impl std::fmt::Display for OptimizeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Optimized: {} vertices, {} faces ({} points merged, \
             {} regions removed, {:.1}% decimated, {} holes filled, \
             {} faces reoriented)",
            self.mesh.vertex_count(),
            self.mesh.face_count(),
            self.points_merged,
            self.regions_removed,
            self.decimation_reduction() * 100.0,
            self.holes_filled,
            self.faces_reoriented
        )
    }
}
