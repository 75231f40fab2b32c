//! Volume file I/O.
//!
//! This crate reads labeled and scalar volumes from uncompressed
//! MetaImage (.mha) and single-file NIfTI-1 (.nii) files, and writes
//! the local-data MetaImage format used for every volumetric artifact
//! in the pipeline: labeled input volumes, binary component masks, and
//! smoothed scalar volumes. The reader is picked by file extension;
//! anything that is not `.nii` is treated as MetaImage.
//!
//! # Example
//!
//! ```no_run
//! use volume_io::{load_labeled, save_volume};
//!
//! let volume = load_labeled("segmentation.nii").unwrap();
//! save_volume(&volume, "copy.mha").unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod mha;
mod nii;
mod raw;

use std::path::Path;

pub use error::{VolumeIoError, VolumeIoResult};
pub use mha::{save_volume, ElementType, WritableElement};
use volume_types::{LabeledVolume, ScalarVolume};

/// Load a labeled volume, widening narrow integer voxels to `u16`.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or if the
/// voxel data is floating-point or contains negative values.
pub fn load_labeled<P: AsRef<Path>>(path: P) -> VolumeIoResult<LabeledVolume> {
    read_raw(path.as_ref())?.into_labeled()
}

/// Load a scalar volume, casting integer voxels to `f32`.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed.
pub fn load_scalar<P: AsRef<Path>>(path: P) -> VolumeIoResult<ScalarVolume> {
    read_raw(path.as_ref())?.into_scalar()
}

fn read_raw(path: &Path) -> VolumeIoResult<raw::RawImage> {
    match path.extension().and_then(std::ffi::OsStr::to_str) {
        Some(ext) if ext.eq_ignore_ascii_case("nii") => nii::read_raw(path),
        _ => mha::read_raw(path),
    }
}
