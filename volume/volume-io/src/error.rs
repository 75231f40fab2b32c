//! Error types for volume I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for volume I/O operations.
pub type VolumeIoResult<T> = Result<T, VolumeIoError>;

/// Errors that can occur while reading or writing volume files.
#[derive(Debug, Error)]
pub enum VolumeIoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Header is malformed or missing a required field.
    #[error("invalid image header: {message}")]
    InvalidHeader {
        /// Description of the problem.
        message: String,
    },

    /// The header names an element type this reader does not handle.
    #[error("unsupported element type: {found}")]
    UnsupportedElementType {
        /// The `ElementType` value found in the header.
        found: String,
    },

    /// Signed integer label data contains a negative value.
    #[error("negative value {value} in integer label data")]
    NegativeLabel {
        /// The offending voxel value.
        value: i16,
    },

    /// Pixel data is shorter or longer than the header promises.
    #[error("pixel data length {len} does not match header ({expected} bytes)")]
    DataLengthMismatch {
        /// Actual data length in bytes.
        len: usize,
        /// Expected data length in bytes.
        expected: usize,
    },

    /// The file references external pixel data, which is not supported.
    #[error("only ElementDataFile = LOCAL is supported, got {found}")]
    ExternalData {
        /// The `ElementDataFile` value found in the header.
        found: String,
    },

    /// Volume construction failed after reading.
    #[error(transparent)]
    Volume(#[from] volume_types::VolumeError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VolumeIoError {
    /// Create an `InvalidHeader` error with the given message.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }
}
