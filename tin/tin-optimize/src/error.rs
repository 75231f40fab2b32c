//! Error types for mesh optimization.

use thiserror::Error;

/// Result type for mesh optimization.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur during mesh optimization.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The input mesh has no faces.
    #[error("input mesh has no faces")]
    EmptyMesh,

    /// Every connected region fell below the artifact threshold.
    #[error(
        "no geometry survived artifact removal: all {region_count} regions \
         below {min_cells} faces"
    )]
    NoSurvivingGeometry {
        /// Number of regions found.
        region_count: usize,
        /// The face count threshold.
        min_cells: usize,
    },

    /// A boundary loop could not be triangulated.
    #[error("hole filling failed: {reason}")]
    HoleFillFailed {
        /// Description of the failure.
        reason: String,
    },
}
