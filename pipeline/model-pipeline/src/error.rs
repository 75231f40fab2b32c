//! Error types for the pipeline driver.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The command line was malformed.
    #[error("usage: {message}")]
    Usage {
        /// What was wrong.
        message: String,
    },

    /// A positional parameter failed to parse.
    #[error("invalid value for {name}: {value:?}")]
    InvalidParam {
        /// Parameter name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// An input path has no usable file stem.
    #[error("cannot derive an output name from {path:?}")]
    BadInputName {
        /// The offending path.
        path: std::path::PathBuf,
    },

    /// Volume I/O failure.
    #[error(transparent)]
    VolumeIo(#[from] volume_io::VolumeIoError),

    /// Mesh I/O failure.
    #[error(transparent)]
    MeshIo(#[from] tin_io::IoError),

    /// Component extraction failure.
    #[error(transparent)]
    Extract(#[from] volume_extract::ExtractError),

    /// Isosurface extraction failure.
    #[error(transparent)]
    Isosurface(#[from] volume_isosurface::IsosurfaceError),

    /// I/O failure on the path streams.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
