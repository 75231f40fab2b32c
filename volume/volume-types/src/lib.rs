//! Core volumetric grid types for labeled anatomical images.
//!
//! This crate provides the foundational types for volume processing:
//!
//! - [`Volume`] - A dense 3D grid of voxels with spacing/origin metadata
//! - [`LabeledVolume`] - Integer-labeled segmentation volume (background = 0)
//! - [`ComponentVolume`] - Binary volume isolating exactly one label
//! - [`ScalarVolume`] - Floating-point volume (smoothing output)
//!
//! # Memory Layout
//!
//! Voxels are stored in a flat `Vec` in x-fastest order: the voxel at
//! `(x, y, z)` lives at index `x + y * nx + z * nx * ny`.
//!
//! # Units
//!
//! `spacing` and `origin` are in physical units (typically millimeters);
//! the grid itself is unit-agnostic.
//!
//! # Example
//!
//! ```
//! use volume_types::LabeledVolume;
//!
//! let mut volume = LabeledVolume::zeros([4, 4, 4]);
//! volume.set(1, 1, 1, 3);
//!
//! assert_eq!(volume.get(1, 1, 1), 3);
//! assert_eq!(volume.distinct_labels(), vec![3]);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod component;
mod volume;

pub use component::ComponentVolume;
pub use volume::{LabeledVolume, ScalarVolume, Volume, VolumeError, VolumeResult, Voxel};
