//! Parameters for the optimization pass.

/// Parameters controlling the six optimization stages.
#[derive(Debug, Clone)]
pub struct OptimizeParams {
    /// Euclidean distance below which points are merged. Default: 0.00025
    pub merge_tolerance: f64,

    /// Connected regions with fewer faces than this are removed as
    /// artifacts. Default: 50
    pub artifact_min_cells: usize,

    /// Fraction of faces to remove during decimation (0.0 to 1.0).
    /// Default: 0.01
    pub decimate_fraction: f64,

    /// Number of Laplacian smoothing passes. Default: 10
    pub smooth_iterations: usize,

    /// Fraction of the step toward the neighbor centroid per smoothing
    /// pass (0.0 to 1.0). Default: 0.1
    pub smooth_relaxation: f64,

    /// Maximum spatial span of a boundary loop for it to be filled.
    /// Default: 10.0
    pub hole_max_size: f64,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self {
            merge_tolerance: 0.00025,
            artifact_min_cells: 50,
            decimate_fraction: 0.01,
            smooth_iterations: 10,
            smooth_relaxation: 0.1,
            hole_max_size: 10.0,
        }
    }
}

impl OptimizeParams {
    /// Set the point merge tolerance.
    #[must_use]
    pub const fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    /// Set the artifact region threshold.
    #[must_use]
    pub const fn with_artifact_min_cells(mut self, min_cells: usize) -> Self {
        self.artifact_min_cells = min_cells;
        self
    }

    /// Set the decimation fraction, clamped to [0, 1].
    #[must_use]
    pub fn with_decimate_fraction(mut self, fraction: f64) -> Self {
        self.decimate_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the smoothing pass count and relaxation factor.
    #[must_use]
    pub fn with_smoothing(mut self, iterations: usize, relaxation: f64) -> Self {
        self.smooth_iterations = iterations;
        self.smooth_relaxation = relaxation.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum hole span.
    #[must_use]
    pub const fn with_hole_max_size(mut self, max_size: f64) -> Self {
        self.hole_max_size = max_size;
        self
    }
}
