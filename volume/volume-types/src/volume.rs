//! Dense 3D voxel grid with physical metadata.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result type for volume construction.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// Errors raised by volume construction and indexing.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Data length does not match the grid dimensions.
    #[error("data length {len} does not match dimensions {dims:?} ({expected} voxels)")]
    DimensionMismatch {
        /// Actual data length.
        len: usize,
        /// Requested grid dimensions.
        dims: [usize; 3],
        /// Expected voxel count (`nx * ny * nz`).
        expected: usize,
    },

    /// One or more grid dimensions are zero.
    #[error("grid dimensions must be nonzero, got {dims:?}")]
    ZeroDimension {
        /// The offending dimensions.
        dims: [usize; 3],
    },
}

/// Marker trait for voxel element types.
pub trait Voxel: Copy + Default + PartialEq {}

impl Voxel for u8 {}
impl Voxel for u16 {}
impl Voxel for f32 {}

/// A dense 3D grid of voxels with spacing and origin metadata.
///
/// The grid stores voxels in x-fastest order. `spacing` and `origin`
/// are opaque to the algorithms in this workspace; they are carried so
/// every derived volume keeps the physical frame of its source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Volume<T: Voxel> {
    dims: [usize; 3],
    /// Physical voxel spacing along each axis.
    pub spacing: [f64; 3],
    /// Physical position of voxel (0, 0, 0).
    pub origin: [f64; 3],
    data: Vec<T>,
}

/// Integer-labeled segmentation volume. Background is label 0.
pub type LabeledVolume = Volume<u16>;

/// Floating-point volume, the output of volumetric smoothing.
pub type ScalarVolume = Volume<f32>;

impl<T: Voxel> Volume<T> {
    /// Create a volume filled with the default element (zero).
    ///
    /// Spacing defaults to unit voxels at the origin.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_types::LabeledVolume;
    ///
    /// let volume = LabeledVolume::zeros([8, 8, 8]);
    /// assert_eq!(volume.voxel_count(), 512);
    /// ```
    #[must_use]
    pub fn zeros(dims: [usize; 3]) -> Self {
        Self {
            dims,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            data: vec![T::default(); dims[0] * dims[1] * dims[2]],
        }
    }

    /// Create a volume from existing data.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DimensionMismatch`] if `data.len()` is not
    /// `nx * ny * nz`, or [`VolumeError::ZeroDimension`] if any dimension
    /// is zero.
    pub fn from_data(
        dims: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        data: Vec<T>,
    ) -> VolumeResult<Self> {
        if dims.contains(&0) {
            return Err(VolumeError::ZeroDimension { dims });
        }
        let expected = dims[0] * dims[1] * dims[2];
        if data.len() != expected {
            return Err(VolumeError::DimensionMismatch {
                len: data.len(),
                dims,
                expected,
            });
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            data,
        })
    }

    /// Grid dimensions `[nx, ny, nz]`.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of voxels.
    #[inline]
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Flat index of voxel `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dims[0] + z * self.dims[0] * self.dims[1]
    }

    /// Voxel value at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.data[self.index(x, y, z)]
    }

    /// Set the voxel at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) {
        let idx = self.index(x, y, z);
        self.data[idx] = value;
    }

    /// Immutable view of the raw voxel data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable view of the raw voxel data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Physical position of the voxel center at `(x, y, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn world_position(&self, x: usize, y: usize, z: usize) -> [f64; 3] {
        [
            self.origin[0] + x as f64 * self.spacing[0],
            self.origin[1] + y as f64 * self.spacing[1],
            self.origin[2] + z as f64 * self.spacing[2],
        ]
    }

    /// Create an empty volume with the same dimensions and metadata.
    #[must_use]
    pub fn same_frame<U: Voxel>(&self) -> Volume<U> {
        Volume {
            dims: self.dims,
            spacing: self.spacing,
            origin: self.origin,
            data: vec![U::default(); self.data.len()],
        }
    }
}

impl LabeledVolume {
    /// All distinct nonzero labels, in ascending order.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_types::LabeledVolume;
    ///
    /// let mut volume = LabeledVolume::zeros([2, 2, 2]);
    /// volume.set(0, 0, 0, 5);
    /// volume.set(1, 0, 0, 2);
    /// volume.set(1, 1, 0, 2);
    ///
    /// assert_eq!(volume.distinct_labels(), vec![2, 5]);
    /// ```
    #[must_use]
    pub fn distinct_labels(&self) -> Vec<u16> {
        let mut present = vec![false; u16::MAX as usize + 1];
        for &v in &self.data {
            present[v as usize] = true;
        }
        (1..=u16::MAX)
            .filter(|&label| present[label as usize])
            .collect()
    }

    /// Count voxels carrying the given label.
    #[must_use]
    pub fn count_label(&self, label: u16) -> usize {
        self.data.iter().filter(|&&v| v == label).count()
    }
}
