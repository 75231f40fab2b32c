//! Isosurface extraction from scalar volumes.
//!
//! Converts a [`ScalarVolume`] into a [`TriangleMesh`] at a given iso
//! level using the surface-nets method: one vertex per grid cell that
//! straddles the level set, placed at the mean of the cell's edge
//! crossings, with a quad emitted around every sign-changing voxel
//! edge.
//!
//! The output mesh lives in the physical frame of the volume (spacing
//! and origin applied). Face winding is locally consistent with the
//! sign of the field; global orientation is unified downstream by the
//! mesh optimizer.
//!
//! # Example
//!
//! ```
//! use volume_isosurface::extract_isosurface;
//! use volume_types::ScalarVolume;
//!
//! let mut volume = ScalarVolume::zeros([4, 4, 4]);
//! volume.set(1, 1, 1, 1.0);
//! volume.set(2, 1, 1, 1.0);
//!
//! let mesh = extract_isosurface(&volume, 0.5).unwrap();
//! assert!(!mesh.is_empty());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod surface_nets;

pub use surface_nets::extract_isosurface;

use thiserror::Error;

/// Result type for isosurface extraction.
pub type IsosurfaceResult<T> = Result<T, IsosurfaceError>;

/// Errors raised by isosurface extraction.
#[derive(Debug, Error)]
pub enum IsosurfaceError {
    /// The volume has fewer than two voxels along some axis, so it
    /// contains no cells to contour.
    #[error("volume dimensions {dims:?} too small to contour (need at least 2 per axis)")]
    VolumeTooSmall {
        /// The offending dimensions.
        dims: [usize; 3],
    },
}
