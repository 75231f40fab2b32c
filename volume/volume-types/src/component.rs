//! Binary component volume isolating a single label.

use crate::volume::{LabeledVolume, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary volume isolating exactly one label of a [`LabeledVolume`].
///
/// Foreground voxels hold 1, background 0. Dimensions, spacing and origin
/// are identical to the source volume. A component is created once by the
/// extractor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentVolume {
    /// The source label this component isolates.
    label: u16,
    grid: Volume<u8>,
}

impl ComponentVolume {
    /// Build the binary mask of `label` from a labeled volume.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_types::{ComponentVolume, LabeledVolume};
    ///
    /// let mut volume = LabeledVolume::zeros([2, 2, 1]);
    /// volume.set(0, 0, 0, 3);
    /// volume.set(1, 1, 0, 3);
    /// volume.set(1, 0, 0, 5);
    ///
    /// let component = ComponentVolume::mask_of(&volume, 3);
    /// assert_eq!(component.label(), 3);
    /// assert_eq!(component.foreground_count(), 2);
    /// ```
    #[must_use]
    pub fn mask_of(volume: &LabeledVolume, label: u16) -> Self {
        let mut grid: Volume<u8> = volume.same_frame();
        for (dst, &src) in grid.data_mut().iter_mut().zip(volume.data()) {
            *dst = u8::from(src == label);
        }
        Self { label, grid }
    }

    /// The label this component was extracted from.
    #[inline]
    #[must_use]
    pub const fn label(&self) -> u16 {
        self.label
    }

    /// The underlying binary grid.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &Volume<u8> {
        &self.grid
    }

    /// Number of foreground (label) voxels.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.grid.data().iter().filter(|&&v| v != 0).count()
    }
}
