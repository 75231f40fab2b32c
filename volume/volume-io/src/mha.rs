//! Uncompressed MetaImage (.mha) reading and writing.
//!
//! Only the local-data variant is supported: an ASCII key/value header
//! terminated by `ElementDataFile = LOCAL`, followed immediately by raw
//! little-endian pixel data.
//!
//! # Header
//!
//! ```text
//! ObjectType = Image
//! NDims = 3
//! BinaryData = True
//! BinaryDataByteOrderMSB = False
//! CompressedData = False
//! TransformMatrix = 1 0 0 0 1 0 0 0 1
//! Offset = ox oy oz
//! ElementSpacing = sx sy sz
//! DimSize = nx ny nz
//! ElementType = MET_UCHAR | MET_SHORT | MET_USHORT | MET_FLOAT
//! ElementDataFile = LOCAL
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use volume_types::{Volume, Voxel};

use crate::error::{VolumeIoError, VolumeIoResult};
use crate::raw::{open, RawImage};

/// Pixel element types this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Unsigned 8-bit (`MET_UCHAR`).
    U8,
    /// Signed 16-bit little-endian (`MET_SHORT`).
    I16,
    /// Unsigned 16-bit little-endian (`MET_USHORT`).
    U16,
    /// 32-bit IEEE float little-endian (`MET_FLOAT`).
    F32,
}

impl ElementType {
    /// Size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// MetaImage name of this element type.
    #[must_use]
    pub const fn met_name(self) -> &'static str {
        match self {
            Self::U8 => "MET_UCHAR",
            Self::I16 => "MET_SHORT",
            Self::U16 => "MET_USHORT",
            Self::F32 => "MET_FLOAT",
        }
    }

    fn from_met_name(name: &str) -> VolumeIoResult<Self> {
        match name {
            "MET_UCHAR" => Ok(Self::U8),
            "MET_SHORT" => Ok(Self::I16),
            "MET_USHORT" => Ok(Self::U16),
            "MET_FLOAT" => Ok(Self::F32),
            other => Err(VolumeIoError::UnsupportedElementType {
                found: other.to_string(),
            }),
        }
    }
}

/// Element types that can be written by [`save_volume`].
pub trait WritableElement: Voxel {
    /// The MetaImage element type for this Rust type.
    const ELEMENT_TYPE: ElementType;

    /// Append the little-endian encoding of `value` to `buf`.
    fn encode(value: Self, buf: &mut Vec<u8>);
}

impl WritableElement for u8 {
    const ELEMENT_TYPE: ElementType = ElementType::U8;

    fn encode(value: Self, buf: &mut Vec<u8>) {
        buf.push(value);
    }
}

impl WritableElement for u16 {
    const ELEMENT_TYPE: ElementType = ElementType::U16;

    fn encode(value: Self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

impl WritableElement for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;

    fn encode(value: Self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

/// Save a volume as an uncompressed local-data `.mha` file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_volume<T: WritableElement, P: AsRef<Path>>(
    volume: &Volume<T>,
    path: P,
) -> VolumeIoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let [nx, ny, nz] = volume.dims();
    let [sx, sy, sz] = volume.spacing;
    let [ox, oy, oz] = volume.origin;

    writeln!(writer, "ObjectType = Image")?;
    writeln!(writer, "NDims = 3")?;
    writeln!(writer, "BinaryData = True")?;
    writeln!(writer, "BinaryDataByteOrderMSB = False")?;
    writeln!(writer, "CompressedData = False")?;
    writeln!(writer, "TransformMatrix = 1 0 0 0 1 0 0 0 1")?;
    writeln!(writer, "Offset = {ox} {oy} {oz}")?;
    writeln!(writer, "ElementSpacing = {sx} {sy} {sz}")?;
    writeln!(writer, "DimSize = {nx} {ny} {nz}")?;
    writeln!(writer, "ElementType = {}", T::ELEMENT_TYPE.met_name())?;
    writeln!(writer, "ElementDataFile = LOCAL")?;

    let mut bytes = Vec::with_capacity(volume.voxel_count() * T::ELEMENT_TYPE.size());
    for &value in volume.data() {
        T::encode(value, &mut bytes);
    }
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn read_raw(path: &Path) -> VolumeIoResult<RawImage> {
    let mut reader = BufReader::new(open(path)?);

    let mut dims: Option<[usize; 3]> = None;
    let mut spacing = [1.0; 3];
    let mut origin = [0.0; 3];
    let mut element_type: Option<ElementType> = None;

    // Header lines until ElementDataFile; pixel data follows immediately.
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Err(VolumeIoError::invalid_header(
                "unexpected end of file before ElementDataFile",
            ));
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(VolumeIoError::invalid_header(format!(
                "expected 'key = value', got {:?}",
                line.trim_end()
            )));
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "ObjectType" if value != "Image" => {
                return Err(VolumeIoError::invalid_header(format!(
                    "ObjectType must be Image, got {value}"
                )));
            }
            "NDims" if value != "3" => {
                return Err(VolumeIoError::invalid_header(format!(
                    "only 3-dimensional images are supported, NDims = {value}"
                )));
            }
            "CompressedData" if value.eq_ignore_ascii_case("true") => {
                return Err(VolumeIoError::invalid_header(
                    "compressed MetaImage data is not supported",
                ));
            }
            "BinaryDataByteOrderMSB" if value.eq_ignore_ascii_case("true") => {
                return Err(VolumeIoError::invalid_header(
                    "big-endian MetaImage data is not supported",
                ));
            }
            "DimSize" => dims = Some(parse_triplet(value, "DimSize")?),
            "ElementSpacing" => spacing = parse_triplet(value, "ElementSpacing")?,
            "Offset" => origin = parse_triplet(value, "Offset")?,
            "ElementType" => element_type = Some(ElementType::from_met_name(value)?),
            "ElementDataFile" => {
                if value != "LOCAL" {
                    return Err(VolumeIoError::ExternalData {
                        found: value.to_string(),
                    });
                }
                break;
            }
            _ => {} // Unknown keys are carried by many writers; ignore.
        }
    }

    let dims = dims.ok_or_else(|| VolumeIoError::invalid_header("missing DimSize"))?;
    let element_type =
        element_type.ok_or_else(|| VolumeIoError::invalid_header("missing ElementType"))?;

    let expected = dims[0] * dims[1] * dims[2] * element_type.size();
    let mut bytes = Vec::with_capacity(expected);
    reader.read_to_end(&mut bytes)?;
    if bytes.len() != expected {
        return Err(VolumeIoError::DataLengthMismatch {
            len: bytes.len(),
            expected,
        });
    }

    Ok(RawImage {
        dims,
        spacing,
        origin,
        element_type,
        bytes,
    })
}

fn parse_triplet<T: std::str::FromStr>(value: &str, field: &str) -> VolumeIoResult<[T; 3]> {
    let mut parts = value.split_whitespace();
    let mut next = || -> VolumeIoResult<T> {
        parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| VolumeIoError::invalid_header(format!("malformed {field}: {value:?}")))
    };
    Ok([next()?, next()?, next()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_labeled, load_scalar};
    use tempfile::tempdir;
    use volume_types::{LabeledVolume, ScalarVolume};

    fn sample_labeled() -> LabeledVolume {
        let mut volume = LabeledVolume::zeros([3, 2, 2]);
        volume.spacing = [0.5, 0.5, 1.0];
        volume.origin = [-1.0, 2.0, 0.0];
        volume.set(0, 0, 0, 1);
        volume.set(2, 1, 1, 300);
        volume
    }

    #[test]
    fn labeled_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.mha");

        let volume = sample_labeled();
        save_volume(&volume, &path).unwrap();
        let loaded = load_labeled(&path).unwrap();

        assert_eq!(loaded, volume);
    }

    #[test]
    fn binary_widens_to_labeled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask.mha");

        let mut mask: Volume<u8> = Volume::zeros([2, 2, 2]);
        mask.set(1, 1, 1, 1);
        save_volume(&mask, &path).unwrap();

        let loaded = load_labeled(&path).unwrap();
        assert_eq!(loaded.get(1, 1, 1), 1);
        assert_eq!(loaded.get(0, 0, 0), 0);
    }

    #[test]
    fn scalar_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smoothed.mha");

        let mut volume = ScalarVolume::zeros([2, 2, 1]);
        volume.set(0, 1, 0, 0.75);
        save_volume(&volume, &path).unwrap();

        let loaded = load_scalar(&path).unwrap();
        assert!((loaded.get(0, 1, 0) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn scalar_load_casts_integer_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.mha");

        save_volume(&sample_labeled(), &path).unwrap();
        let loaded = load_scalar(&path).unwrap();
        assert!((loaded.get(2, 1, 1) - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn float_labels_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.mha");

        save_volume(&ScalarVolume::zeros([2, 2, 2]), &path).unwrap();
        let result = load_labeled(&path);
        assert!(matches!(
            result,
            Err(VolumeIoError::UnsupportedElementType { .. })
        ));
    }

    #[test]
    fn short_labels_load_when_non_negative() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.mha");

        let header = "ObjectType = Image\nNDims = 3\nDimSize = 2 1 1\n\
                      ElementType = MET_SHORT\nElementDataFile = LOCAL\n";
        let mut contents = header.as_bytes().to_vec();
        contents.extend_from_slice(&7i16.to_le_bytes());
        contents.extend_from_slice(&0i16.to_le_bytes());
        std::fs::write(&path, contents).unwrap();

        let loaded = load_labeled(&path).unwrap();
        assert_eq!(loaded.get(0, 0, 0), 7);
        assert_eq!(loaded.get(1, 0, 0), 0);
    }

    #[test]
    fn negative_short_labels_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("negative.mha");

        let header = "ObjectType = Image\nNDims = 3\nDimSize = 1 1 1\n\
                      ElementType = MET_SHORT\nElementDataFile = LOCAL\n";
        let mut contents = header.as_bytes().to_vec();
        contents.extend_from_slice(&(-5i16).to_le_bytes());
        std::fs::write(&path, contents).unwrap();

        let result = load_labeled(&path);
        assert!(matches!(
            result,
            Err(VolumeIoError::NegativeLabel { value: -5 })
        ));
    }

    #[test]
    fn missing_file_reported() {
        let result = load_labeled("/nonexistent/volume.mha");
        assert!(matches!(result, Err(VolumeIoError::FileNotFound { .. })));
    }

    #[test]
    fn truncated_data_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.mha");

        let header = "ObjectType = Image\nNDims = 3\nDimSize = 2 2 2\n\
                      ElementType = MET_UCHAR\nElementDataFile = LOCAL\n";
        std::fs::write(&path, format!("{header}abc")).unwrap();

        let result = load_labeled(&path);
        assert!(matches!(
            result,
            Err(VolumeIoError::DataLengthMismatch { len: 3, expected: 8 })
        ));
    }

    #[test]
    fn external_data_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("external.mha");

        let header = "ObjectType = Image\nNDims = 3\nDimSize = 1 1 1\n\
                      ElementType = MET_UCHAR\nElementDataFile = pixels.raw\n";
        std::fs::write(&path, header).unwrap();

        let result = load_labeled(&path);
        assert!(matches!(result, Err(VolumeIoError::ExternalData { .. })));
    }
}
