//! Per-label component extraction.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use volume_types::{ComponentVolume, LabeledVolume};

use crate::error::{ExtractError, ExtractResult};

/// One extracted, persisted component.
#[derive(Debug, Clone)]
pub struct ExtractedComponent {
    /// The source label.
    pub label: u16,
    /// Where the component volume was written (`Component<label>.mha`).
    pub path: PathBuf,
    /// The binary component volume.
    pub volume: ComponentVolume,
}

/// Deterministic file name for a component of the given label.
#[must_use]
pub fn component_file_name(label: u16) -> String {
    format!("Component{label}.mha")
}

/// Extract all sufficiently large label components from a volume.
///
/// Labels are processed in ascending numeric order. For each label, a
/// binary mask is built; masks with fewer than `min_voxel_count`
/// foreground voxels are discarded with a warning. Each surviving
/// component is written to `out_dir` as `Component<label>.mha` before it
/// is returned.
///
/// When a target file already exists, `confirm` is asked whether to
/// overwrite it. Declining skips that single component: it is excluded
/// from the output and extraction continues with the remaining labels.
///
/// # Errors
///
/// - [`ExtractError::EmptyVolume`] if the volume has no nonzero labels.
/// - [`ExtractError::Persist`] if writing any component fails; this
///   aborts the entire extraction.
///
/// An all-labels-filtered outcome is not an error: the result is an
/// empty vector and the caller ends the run normally.
pub fn extract_components(
    volume: &LabeledVolume,
    min_voxel_count: usize,
    out_dir: &Path,
    confirm: &mut dyn FnMut(&Path) -> bool,
) -> ExtractResult<Vec<ExtractedComponent>> {
    let labels = volume.distinct_labels();
    if labels.is_empty() {
        return Err(ExtractError::EmptyVolume);
    }
    info!(labels = labels.len(), "segmenting labeled volume");

    let mut components = Vec::new();
    for label in labels {
        let component = ComponentVolume::mask_of(volume, label);
        let voxels = component.foreground_count();

        if voxels < min_voxel_count {
            warn!(
                label,
                voxels, min_voxel_count, "component below size threshold, discarding"
            );
            continue;
        }

        let path = out_dir.join(component_file_name(label));
        if path.exists() && !confirm(&path) {
            warn!(label, path = %path.display(), "overwrite declined, skipping component");
            continue;
        }

        volume_io::save_volume(component.grid(), &path)
            .map_err(|source| ExtractError::Persist { label, source })?;
        info!(label, voxels, path = %path.display(), "component extracted");

        components.push(ExtractedComponent {
            label,
            path,
            volume: component,
        });
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Volume with labels 1 (8 voxels), 2 (1 voxel), 3 (4 voxels).
    fn three_label_volume() -> LabeledVolume {
        let mut volume = LabeledVolume::zeros([4, 4, 4]);
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    volume.set(x, y, z, 1);
                }
            }
        }
        volume.set(3, 3, 3, 2);
        for x in 0..4 {
            volume.set(x, 3, 0, 3);
        }
        volume
    }

    fn accept_all(_: &Path) -> bool {
        true
    }

    #[test]
    fn zero_threshold_extracts_every_label() {
        let dir = tempdir().unwrap();
        let volume = three_label_volume();

        let components =
            extract_components(&volume, 0, dir.path(), &mut accept_all).unwrap();

        assert_eq!(components.len(), 3);
        assert_eq!(
            components.iter().map(|c| c.label).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // Each component holds exactly the voxels of its label.
        assert_eq!(components[0].volume.foreground_count(), 8);
        assert_eq!(components[1].volume.foreground_count(), 1);
        assert_eq!(components[2].volume.foreground_count(), 4);
        for c in &components {
            assert!(c.path.exists());
        }
    }

    #[test]
    fn threshold_filters_small_components() {
        let dir = tempdir().unwrap();
        let volume = three_label_volume();

        let components =
            extract_components(&volume, 3, dir.path(), &mut accept_all).unwrap();

        assert_eq!(
            components.iter().map(|c| c.label).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(!dir.path().join("Component2.mha").exists());
    }

    #[test]
    fn output_monotone_in_threshold() {
        let volume = three_label_volume();

        let mut previous = usize::MAX;
        for threshold in [0, 2, 5, 9] {
            let sub = tempdir().unwrap();
            let count = extract_components(&volume, threshold, sub.path(), &mut accept_all)
                .unwrap()
                .len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn all_filtered_is_empty_success() {
        let dir = tempdir().unwrap();
        let volume = three_label_volume();

        let components =
            extract_components(&volume, 1000, dir.path(), &mut accept_all).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn empty_volume_is_fatal() {
        let dir = tempdir().unwrap();
        let volume = LabeledVolume::zeros([4, 4, 4]);

        let result = extract_components(&volume, 0, dir.path(), &mut accept_all);
        assert!(matches!(result, Err(ExtractError::EmptyVolume)));
    }

    #[test]
    fn declined_overwrite_skips_only_that_component() {
        let dir = tempdir().unwrap();
        let volume = three_label_volume();

        // Pre-existing Component2.mha forces a confirmation for label 2.
        std::fs::write(dir.path().join("Component2.mha"), b"stale").unwrap();

        let mut decline_label_2 =
            |path: &Path| !path.to_string_lossy().contains("Component2");
        let components =
            extract_components(&volume, 0, dir.path(), &mut decline_label_2).unwrap();

        assert_eq!(
            components.iter().map(|c| c.label).collect::<Vec<_>>(),
            vec![1, 3]
        );
        // The stale file is untouched.
        assert_eq!(
            std::fs::read(dir.path().join("Component2.mha")).unwrap(),
            b"stale"
        );
    }

    #[test]
    fn accepted_overwrite_replaces_file() {
        let dir = tempdir().unwrap();
        let volume = three_label_volume();

        std::fs::write(dir.path().join("Component1.mha"), b"stale").unwrap();
        let components =
            extract_components(&volume, 0, dir.path(), &mut accept_all).unwrap();

        assert_eq!(components.len(), 3);
        let reloaded = volume_io::load_labeled(dir.path().join("Component1.mha")).unwrap();
        assert_eq!(reloaded.count_label(1), 8);
    }

    #[test]
    fn component_file_name_is_deterministic() {
        assert_eq!(component_file_name(7), "Component7.mha");
        assert_eq!(component_file_name(12), "Component12.mha");
    }
}
