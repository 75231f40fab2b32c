//! Decoded in-memory form shared by the input formats.

use std::fs::File;
use std::path::Path;

use volume_types::{LabeledVolume, ScalarVolume};

use crate::error::{VolumeIoError, VolumeIoResult};
use crate::mha::ElementType;

/// Parsed header metadata plus raw little-endian pixel bytes.
///
/// Every reader produces this; the conversions below turn it into a
/// typed volume.
pub(crate) struct RawImage {
    pub dims: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub element_type: ElementType,
    pub bytes: Vec<u8>,
}

impl RawImage {
    /// Decode into a labeled volume, widening narrow integer types.
    ///
    /// Floating-point data is rejected; signed 16-bit data must be
    /// non-negative.
    pub(crate) fn into_labeled(self) -> VolumeIoResult<LabeledVolume> {
        let data: Vec<u16> = match self.element_type {
            ElementType::U8 => self.bytes.iter().map(|&b| u16::from(b)).collect(),
            ElementType::U16 => self
                .bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
            ElementType::I16 => {
                let mut data = Vec::with_capacity(self.bytes.len() / 2);
                for c in self.bytes.chunks_exact(2) {
                    let value = i16::from_le_bytes([c[0], c[1]]);
                    let label = u16::try_from(value)
                        .map_err(|_| VolumeIoError::NegativeLabel { value })?;
                    data.push(label);
                }
                data
            }
            ElementType::F32 => {
                return Err(VolumeIoError::UnsupportedElementType {
                    found: "floating-point data (labels must be integer)".to_string(),
                })
            }
        };
        Ok(LabeledVolume::from_data(
            self.dims,
            self.spacing,
            self.origin,
            data,
        )?)
    }

    /// Decode into a scalar volume, casting integers to `f32`.
    pub(crate) fn into_scalar(self) -> VolumeIoResult<ScalarVolume> {
        let data: Vec<f32> = match self.element_type {
            ElementType::U8 => self.bytes.iter().map(|&b| f32::from(b)).collect(),
            ElementType::U16 => self
                .bytes
                .chunks_exact(2)
                .map(|c| f32::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
            ElementType::I16 => self
                .bytes
                .chunks_exact(2)
                .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])))
                .collect(),
            ElementType::F32 => self
                .bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };
        Ok(ScalarVolume::from_data(
            self.dims,
            self.spacing,
            self.origin,
            data,
        )?)
    }
}

/// Open a file, mapping the missing-file case to its own variant.
pub(crate) fn open(path: &Path) -> VolumeIoResult<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VolumeIoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            VolumeIoError::Io(e)
        }
    })
}
