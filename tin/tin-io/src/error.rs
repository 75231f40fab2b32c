//! Error types for mesh I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file is not a legacy VTK file or the version line is missing.
    #[error("invalid VTK header: {message}")]
    InvalidHeader {
        /// Description of what was invalid.
        message: String,
    },

    /// The file uses a data encoding other than ASCII.
    #[error("unsupported VTK encoding: {encoding} (only ASCII is supported)")]
    UnsupportedEncoding {
        /// The encoding keyword found in the file.
        encoding: String,
    },

    /// The dataset is not POLYDATA.
    #[error("unsupported VTK dataset: {dataset} (only POLYDATA is supported)")]
    UnsupportedDataset {
        /// The dataset keyword found in the file.
        dataset: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A polygon references a point index beyond the point list.
    #[error("face references point {index} but only {point_count} points are defined")]
    IndexOutOfRange {
        /// The out-of-range index.
        index: usize,
        /// Number of points in the file.
        point_count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Create an `InvalidHeader` error with the given message.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }
}
