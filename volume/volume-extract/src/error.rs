//! Error types for component extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during component extraction.
///
/// Every variant is fatal for the whole run: a failed read, mask or write
/// for one label aborts extraction entirely. The only non-fatal outcomes
/// (size filtering, overwrite decline) are not errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The volume contains no nonzero labels at all.
    #[error("volume contains no labeled components")]
    EmptyVolume,

    /// Persisting a component volume failed.
    #[error("failed to persist component {label}: {source}")]
    Persist {
        /// Label of the component that could not be written.
        label: u16,
        /// Underlying I/O error.
        source: volume_io::VolumeIoError,
    },
}
