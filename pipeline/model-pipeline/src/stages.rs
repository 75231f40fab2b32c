//! In-process stage implementations shared by the stage binaries.

use std::path::Path;

use tin_optimize::OptimizeParams;
use tracing::{info, warn};
use volume_smooth::SmoothParams;

use crate::artifact::{derived_path, stripped_path, ArtifactDescriptor, PipelineStage};
use crate::confirm::ConfirmPolicy;
use crate::error::{PipelineError, PipelineResult};

/// Re-encode a volume into the working directory.
///
/// Accepts MetaImage (.mha) and NIfTI-1 (.nii) inputs; the output is
/// always MetaImage, keeping the input's base name with an `.mha`
/// extension.
/// Returns `None` when the target exists and overwriting is declined.
///
/// # Errors
///
/// Fails when the input cannot be read or the output cannot be written.
pub fn convert_volume(
    input: &Path,
    out_dir: &Path,
    confirm: &mut dyn ConfirmPolicy,
) -> PipelineResult<Option<ArtifactDescriptor>> {
    let volume = volume_io::load_labeled(input)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::BadInputName {
            path: input.to_path_buf(),
        })?;
    let target = out_dir.join(format!("{stem}.mha"));

    if target.exists() && !confirm.confirm_overwrite(&target) {
        warn!(path = %target.display(), "overwrite declined, skipping conversion");
        return Ok(None);
    }

    volume_io::save_volume(&volume, &target)?;
    info!(input = %input.display(), output = %target.display(), "volume converted");
    Ok(Some(ArtifactDescriptor::new(
        target,
        PipelineStage::Converted,
    )))
}

/// Extract per-label binary components from a labeled volume.
///
/// # Errors
///
/// Propagates extraction failures; an empty volume or a failed
/// component write aborts the run.
pub fn extract_components_stage(
    input: &Path,
    min_voxel_count: usize,
    out_dir: &Path,
    confirm: &mut dyn ConfirmPolicy,
) -> PipelineResult<Vec<ArtifactDescriptor>> {
    let volume = volume_io::load_labeled(input)?;

    let components = volume_extract::extract_components(
        &volume,
        min_voxel_count,
        out_dir,
        &mut |path| confirm.confirm_overwrite(path),
    )?;

    Ok(components
        .into_iter()
        .map(|c| ArtifactDescriptor::for_label(c.path, c.label, PipelineStage::Component))
        .collect())
}

/// Smooth one component volume, writing `<stem>_smoothed.mha` next to it.
///
/// # Errors
///
/// Fails when the input cannot be read or the output cannot be written.
pub fn smooth_component_stage(
    input: &Path,
    params: &SmoothParams,
) -> PipelineResult<ArtifactDescriptor> {
    let volume = volume_io::load_scalar(input)?;
    let smoothed = volume_smooth::smooth_volume(&volume, params);

    let target = derived_path(input, "_smoothed", "mha")?;
    volume_io::save_volume(&smoothed, &target)?;
    info!(input = %input.display(), output = %target.display(), "volume smoothed");
    Ok(ArtifactDescriptor::new(
        target,
        PipelineStage::SmoothedVolume,
    ))
}

/// Contour one smoothed volume into a mesh.
///
/// The mesh is named after the component, not the smoothing
/// intermediate: `Component<N>_smoothed.mha` yields `Component<N>.vtk`,
/// so the optimizer's `_optimized` suffix lands on the component name.
/// A volume with no surface at the iso level yields no artifact.
///
/// # Errors
///
/// Fails when the input cannot be read, the volume is too small to
/// contour, or the output cannot be written.
pub fn extract_isosurface_stage(
    input: &Path,
    iso: f64,
) -> PipelineResult<Option<ArtifactDescriptor>> {
    let volume = volume_io::load_scalar(input)?;
    let mesh = volume_isosurface::extract_isosurface(&volume, iso)?;

    if mesh.is_empty() {
        warn!(input = %input.display(), iso, "no surface at iso level, skipping");
        return Ok(None);
    }

    let target = stripped_path(input, "_smoothed", "vtk")?;
    tin_io::save_vtk(&mesh, &target)?;
    info!(
        input = %input.display(),
        output = %target.display(),
        faces = mesh.face_count(),
        "isosurface extracted"
    );
    Ok(Some(ArtifactDescriptor::new(
        target,
        PipelineStage::Isosurface,
    )))
}

/// Optimize one mesh, writing `<stem>_optimized.vtk` next to it.
///
/// An optimization failure (empty mesh, nothing surviving artifact
/// removal, hole fill failure) skips this mesh and the run continues;
/// failing to read the input or write the result is fatal.
///
/// # Errors
///
/// Fails on mesh I/O errors only.
pub fn optimize_mesh_stage(
    input: &Path,
    params: &OptimizeParams,
) -> PipelineResult<Option<ArtifactDescriptor>> {
    let mesh = tin_io::load_vtk(input)?;

    let outcome = match tin_optimize::optimize(&mesh, params) {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(input = %input.display(), %error, "optimization failed, skipping mesh");
            return Ok(None);
        }
    };

    let target = derived_path(input, "_optimized", "vtk")?;
    tin_io::save_vtk(&outcome.mesh, &target)?;
    info!(input = %input.display(), output = %target.display(), %outcome, "mesh optimized");
    Ok(Some(ArtifactDescriptor::new(
        target,
        PipelineStage::OptimizedMesh,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AlwaysNo, AlwaysYes, ConfirmPolicy};
    use tempfile::tempdir;
    use tin_types::unit_cube;
    use volume_types::LabeledVolume;

    fn two_blob_volume() -> LabeledVolume {
        let mut volume = LabeledVolume::zeros([8, 8, 8]);
        for x in 1..4 {
            for y in 1..4 {
                for z in 1..4 {
                    volume.set(x, y, z, 1);
                }
            }
        }
        volume.set(6, 6, 6, 2);
        volume
    }

    #[test]
    fn convert_roundtrips_volume() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.mha");
        volume_io::save_volume(&two_blob_volume(), &input).unwrap();

        let out_dir = dir.path().join("work");
        std::fs::create_dir(&out_dir).unwrap();
        let artifact = convert_volume(&input, &out_dir, &mut AlwaysYes)
            .unwrap()
            .unwrap();

        assert_eq!(artifact.path, out_dir.join("scan.mha"));
        assert_eq!(artifact.stage, PipelineStage::Converted);
        let reloaded = volume_io::load_labeled(&artifact.path).unwrap();
        assert_eq!(reloaded.count_label(1), 27);
    }

    #[test]
    fn convert_ingests_nifti() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.nii");

        // Minimal single-file NIfTI-1: 348-byte header, extension
        // flag, then 2x2x2 uint8 voxels with one labeled corner.
        let mut header = vec![0u8; 348];
        header[0..4].copy_from_slice(&348i32.to_le_bytes());
        header[40..42].copy_from_slice(&3i16.to_le_bytes());
        for at in [42, 44, 46] {
            header[at..at + 2].copy_from_slice(&2i16.to_le_bytes());
        }
        header[70..72].copy_from_slice(&2i16.to_le_bytes()); // uint8
        for at in [80, 84, 88] {
            header[at..at + 4].copy_from_slice(&1.0f32.to_le_bytes());
        }
        header[108..112].copy_from_slice(&352.0f32.to_le_bytes());
        header[344..348].copy_from_slice(b"n+1\0");
        let mut contents = header;
        contents.extend_from_slice(&[0u8; 4]);
        contents.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 5]);
        std::fs::write(&input, contents).unwrap();

        let artifact = convert_volume(&input, dir.path(), &mut AlwaysYes)
            .unwrap()
            .unwrap();

        assert_eq!(artifact.path, dir.path().join("scan.mha"));
        let volume = volume_io::load_labeled(&artifact.path).unwrap();
        assert_eq!(volume.get(1, 1, 1), 5);
        assert_eq!(volume.count_label(5), 1);
    }

    #[test]
    fn convert_respects_declined_overwrite() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.mha");
        volume_io::save_volume(&two_blob_volume(), &input).unwrap();

        // Target exists: the same directory, same name.
        let artifact = convert_volume(&input, dir.path(), &mut AlwaysNo).unwrap();
        assert!(artifact.is_none());
    }

    #[test]
    fn extract_stage_produces_component_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("labels.mha");
        volume_io::save_volume(&two_blob_volume(), &input).unwrap();

        let artifacts =
            extract_components_stage(&input, 0, dir.path(), &mut AlwaysYes).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].source_label, Some(1));
        assert_eq!(artifacts[0].path, dir.path().join("Component1.mha"));
        assert!(artifacts[1].path.exists());
    }

    #[test]
    fn smooth_stage_writes_sibling_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Component1.mha");
        let mask = volume_types::ComponentVolume::mask_of(&two_blob_volume(), 1);
        volume_io::save_volume(mask.grid(), &input).unwrap();

        let params = SmoothParams::default().with_iterations(2);
        let artifact = smooth_component_stage(&input, &params).unwrap();

        assert_eq!(artifact.path, dir.path().join("Component1_smoothed.mha"));
        let smoothed = volume_io::load_scalar(&artifact.path).unwrap();
        assert_eq!(smoothed.dims(), [8, 8, 8]);
    }

    #[test]
    fn isosurface_stage_writes_vtk() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Component1_smoothed.mha");
        let mask = volume_types::ComponentVolume::mask_of(&two_blob_volume(), 1);
        let scalar: volume_types::ScalarVolume = {
            let mut v = mask.grid().same_frame();
            for (dst, &src) in v.data_mut().iter_mut().zip(mask.grid().data()) {
                *dst = f32::from(src);
            }
            v
        };
        volume_io::save_volume(&scalar, &input).unwrap();

        let artifact = extract_isosurface_stage(&input, 0.5).unwrap().unwrap();
        // The smoothing suffix is dropped from the mesh name.
        assert_eq!(artifact.path, dir.path().join("Component1.vtk"));

        let mesh = tin_io::load_vtk(&artifact.path).unwrap();
        assert!(!mesh.is_empty());
    }

    #[test]
    fn empty_isosurface_yields_no_artifact() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.mha");
        let volume = volume_types::ScalarVolume::zeros([4, 4, 4]);
        volume_io::save_volume(&volume, &input).unwrap();

        let artifact = extract_isosurface_stage(&input, 0.5).unwrap();
        assert!(artifact.is_none());
    }

    #[test]
    fn optimize_stage_writes_optimized_mesh() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Component1.vtk");
        tin_io::save_vtk(&unit_cube(), &input).unwrap();

        let params = OptimizeParams::default()
            .with_artifact_min_cells(1)
            .with_decimate_fraction(0.0)
            .with_smoothing(0, 0.0);
        let artifact = optimize_mesh_stage(&input, &params).unwrap().unwrap();

        assert_eq!(artifact.path, dir.path().join("Component1_optimized.vtk"));
        let optimized = tin_io::load_vtk(&artifact.path).unwrap();
        assert!(optimized.normals.is_some());
    }

    #[test]
    fn optimize_stage_skips_failed_mesh() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("debris.vtk");
        // A single triangle falls below any realistic artifact threshold.
        let triangle = tin_types::TriangleMesh::from_parts(
            vec![
                tin_types::Point3::new(0.0, 0.0, 0.0),
                tin_types::Point3::new(1.0, 0.0, 0.0),
                tin_types::Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        tin_io::save_vtk(&triangle, &input).unwrap();

        let artifact = optimize_mesh_stage(&input, &OptimizeParams::default()).unwrap();
        assert!(artifact.is_none());
    }

    #[test]
    fn optimize_stage_missing_input_is_fatal() {
        let result = optimize_mesh_stage(Path::new("/nonexistent.vtk"), &OptimizeParams::default());
        assert!(matches!(result, Err(PipelineError::MeshIo(_))));
    }

    /// Labels 1 (64 voxels), 2 (1 voxel), 3 (27 voxels) in a 12^3 grid.
    fn three_blob_volume() -> LabeledVolume {
        let mut volume = LabeledVolume::zeros([12, 12, 12]);
        for x in 1..5 {
            for y in 1..5 {
                for z in 1..5 {
                    volume.set(x, y, z, 1);
                }
            }
        }
        volume.set(10, 10, 10, 2);
        for x in 6..9 {
            for y in 6..9 {
                for z in 6..9 {
                    volume.set(x, y, z, 3);
                }
            }
        }
        volume
    }

    fn chain_params() -> (SmoothParams, OptimizeParams) {
        (
            SmoothParams::default().with_iterations(2),
            OptimizeParams::default()
                .with_artifact_min_cells(1)
                .with_decimate_fraction(0.0)
                .with_smoothing(0, 0.0),
        )
    }

    /// Declines overwriting any path whose name contains the pattern.
    struct DeclineMatching(&'static str);

    impl ConfirmPolicy for DeclineMatching {
        fn confirm_overwrite(&mut self, path: &Path) -> bool {
            !path.to_string_lossy().contains(self.0)
        }
    }

    #[test]
    fn full_chain_yields_component_named_optimized_meshes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("labels.mha");
        volume_io::save_volume(&three_blob_volume(), &input).unwrap();

        // Label 2 is a single voxel, dropped by the size threshold.
        let components = extract_components_stage(&input, 8, dir.path(), &mut AlwaysYes).unwrap();
        assert_eq!(
            components
                .iter()
                .filter_map(|c| c.source_label)
                .collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(!dir.path().join("Component2.mha").exists());

        let (smooth, optimize) = chain_params();
        let mut outputs = Vec::new();
        for component in &components {
            let smoothed = smooth_component_stage(&component.path, &smooth).unwrap();
            let raw = extract_isosurface_stage(&smoothed.path, 0.5)
                .unwrap()
                .unwrap();
            let optimized = optimize_mesh_stage(&raw.path, &optimize).unwrap().unwrap();
            outputs.push(optimized.path);
        }

        // Suffixes chain off the component name end to end.
        assert_eq!(
            outputs,
            vec![
                dir.path().join("Component1_optimized.vtk"),
                dir.path().join("Component3_optimized.vtk"),
            ]
        );
        for path in &outputs {
            assert!(tin_io::load_vtk(path).unwrap().normals.is_some());
        }
    }

    #[test]
    fn declined_component_never_reaches_downstream_stages() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("labels.mha");
        volume_io::save_volume(&three_blob_volume(), &input).unwrap();

        // A stale Component2.mha forces a confirmation, which the
        // policy declines; labels 1 and 3 proceed unaffected.
        std::fs::write(dir.path().join("Component2.mha"), b"stale").unwrap();
        let mut policy = DeclineMatching("Component2");

        let components = extract_components_stage(&input, 0, dir.path(), &mut policy).unwrap();
        assert_eq!(
            components
                .iter()
                .filter_map(|c| c.source_label)
                .collect::<Vec<_>>(),
            vec![1, 3]
        );

        let (smooth, optimize) = chain_params();
        for component in &components {
            let smoothed = smooth_component_stage(&component.path, &smooth).unwrap();
            let raw = extract_isosurface_stage(&smoothed.path, 0.5)
                .unwrap()
                .unwrap();
            optimize_mesh_stage(&raw.path, &optimize).unwrap().unwrap();
        }

        assert!(dir.path().join("Component1_optimized.vtk").exists());
        assert!(dir.path().join("Component3_optimized.vtk").exists());
        assert!(!dir.path().join("Component2_optimized.vtk").exists());
        assert_eq!(
            std::fs::read(dir.path().join("Component2.mha")).unwrap(),
            b"stale"
        );
    }
}
