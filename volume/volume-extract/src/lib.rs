//! Per-label component extraction from labeled volumes.
//!
//! Turns one multi-label segmentation volume into a set of binary
//! component volumes, one per surviving label, filtered by voxel count
//! and persisted with deterministic names (`Component<label>.mha`).
//!
//! # Example
//!
//! ```
//! use volume_types::LabeledVolume;
//! use volume_extract::extract_components;
//!
//! let mut volume = LabeledVolume::zeros([4, 4, 4]);
//! volume.set(1, 1, 1, 2);
//!
//! let dir = tempfile::tempdir().unwrap();
//! let components =
//!     extract_components(&volume, 0, dir.path(), &mut |_| true).unwrap();
//! assert_eq!(components.len(), 1);
//! assert_eq!(components[0].label, 2);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod extract;

pub use error::{ExtractError, ExtractResult};
pub use extract::{component_file_name, extract_components, ExtractedComponent};
