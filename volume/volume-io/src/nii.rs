//! Single-file NIfTI-1 (.nii) reading.
//!
//! Only the uncompressed single-file layout is handled: a 348-byte
//! little-endian header, a 4-byte extension flag, then raw pixel data
//! starting at `vox_offset`. Orientation is reduced to the voxel
//! spacing (`pixdim`) and translation (`qoffset_*`); rotation parts of
//! the qform/sform are ignored, which matches how the rest of the
//! pipeline places meshes in space.

use std::io::Read;
use std::path::Path;

use crate::error::{VolumeIoError, VolumeIoResult};
use crate::mha::ElementType;
use crate::raw::{open, RawImage};

const HEADER_LEN: usize = 348;
const MIN_VOX_OFFSET: f32 = 352.0;

// NIfTI-1 datatype codes.
const DT_UINT8: i16 = 2;
const DT_INT16: i16 = 4;
const DT_FLOAT32: i16 = 16;
const DT_UINT16: i16 = 512;

pub(crate) fn read_raw(path: &Path) -> VolumeIoResult<RawImage> {
    let mut file = open(path)?;
    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header)?;

    if read_i32(&header, 0) != HEADER_LEN as i32 {
        return Err(VolumeIoError::invalid_header(
            "sizeof_hdr is not 348; not a little-endian NIfTI-1 file",
        ));
    }
    if &header[344..348] != b"n+1\0" {
        return Err(VolumeIoError::invalid_header(
            "magic is not 'n+1'; only single-file NIfTI-1 is supported",
        ));
    }

    let ndims = read_i16(&header, 40);
    if !(3..=7).contains(&ndims) {
        return Err(VolumeIoError::invalid_header(format!(
            "expected a 3-dimensional image, dim[0] = {ndims}"
        )));
    }
    // Trailing dimensions beyond the third must be degenerate.
    for axis in 4..=usize::try_from(ndims).unwrap_or(0) {
        let extent = read_i16(&header, 40 + 2 * axis);
        if extent > 1 {
            return Err(VolumeIoError::invalid_header(format!(
                "dim[{axis}] = {extent}; only 3-dimensional images are supported"
            )));
        }
    }

    let mut dims = [0usize; 3];
    for (axis, dim) in dims.iter_mut().enumerate() {
        let extent = read_i16(&header, 42 + 2 * axis);
        if extent < 1 {
            return Err(VolumeIoError::invalid_header(format!(
                "dim[{}] = {extent} is not positive",
                axis + 1
            )));
        }
        *dim = extent as usize;
    }

    let datatype = read_i16(&header, 70);
    let element_type = match datatype {
        DT_UINT8 => ElementType::U8,
        DT_INT16 => ElementType::I16,
        DT_UINT16 => ElementType::U16,
        DT_FLOAT32 => ElementType::F32,
        other => {
            return Err(VolumeIoError::UnsupportedElementType {
                found: format!("NIfTI datatype code {other}"),
            })
        }
    };

    let spacing = [
        f64::from(read_f32(&header, 80).abs()),
        f64::from(read_f32(&header, 84).abs()),
        f64::from(read_f32(&header, 88).abs()),
    ];
    let origin = [
        f64::from(read_f32(&header, 268)),
        f64::from(read_f32(&header, 272)),
        f64::from(read_f32(&header, 276)),
    ];

    let vox_offset = read_f32(&header, 108);
    if vox_offset < MIN_VOX_OFFSET {
        return Err(VolumeIoError::invalid_header(format!(
            "vox_offset {vox_offset} is below the single-file minimum of {MIN_VOX_OFFSET}"
        )));
    }
    // Skip the extension flag and any header extensions.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let skip = vox_offset as u64 - HEADER_LEN as u64;
    std::io::copy(&mut (&mut file).take(skip), &mut std::io::sink())?;

    let expected = dims[0] * dims[1] * dims[2] * element_type.size();
    let mut bytes = Vec::with_capacity(expected);
    file.read_to_end(&mut bytes)?;
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

fn read_i16(header: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([header[offset], header[offset + 1]])
}

fn read_i32(header: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ])
}

fn read_f32(header: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ])
}
