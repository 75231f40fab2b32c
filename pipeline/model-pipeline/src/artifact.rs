//! Artifact descriptors and the path-list stream format.
//!
//! Each stage writes the absolute paths of its output artifacts to
//! stdout, one per line, and the next stage reads that list from its
//! stdin. In-process the provenance travels alongside the path as an
//! [`ArtifactDescriptor`]; only the path crosses the stream.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// Which stage produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Re-encoded input volume.
    Converted,
    /// Binary component volume.
    Component,
    /// Diffusion-smoothed component volume.
    SmoothedVolume,
    /// Raw isosurface mesh.
    Isosurface,
    /// Optimized surface mesh.
    OptimizedMesh,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Converted => "converted",
            Self::Component => "component",
            Self::SmoothedVolume => "smoothed volume",
            Self::Isosurface => "isosurface",
            Self::OptimizedMesh => "optimized mesh",
        };
        f.write_str(name)
    }
}

/// One pipeline artifact with its provenance.
///
/// Carrying the source label here means downstream stages never have
/// to recover it by parsing file names.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    /// Where the artifact lives on disk.
    pub path: PathBuf,
    /// The segmentation label it came from, when known.
    pub source_label: Option<u16>,
    /// The stage that produced it.
    pub stage: PipelineStage,
}

impl ArtifactDescriptor {
    /// Create a descriptor without label provenance.
    #[must_use]
    pub fn new(path: PathBuf, stage: PipelineStage) -> Self {
        Self {
            path,
            source_label: None,
            stage,
        }
    }

    /// Create a descriptor for a labeled component artifact.
    #[must_use]
    pub fn for_label(path: PathBuf, label: u16, stage: PipelineStage) -> Self {
        Self {
            path,
            source_label: Some(label),
            stage,
        }
    }
}

/// Read a newline-delimited path list, skipping blank lines.
///
/// # Errors
///
/// Returns an error when the underlying reader fails.
pub fn read_path_list<R: BufRead>(reader: R) -> PipelineResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }
    Ok(paths)
}

/// Write the artifact paths, one per line.
///
/// # Errors
///
/// Returns an error when the underlying writer fails.
pub fn write_path_list<W: Write>(
    mut writer: W,
    artifacts: &[ArtifactDescriptor],
) -> PipelineResult<()> {
    for artifact in artifacts {
        writeln!(writer, "{}", artifact.path.display())?;
    }
    writer.flush()?;
    Ok(())
}

/// Derive a sibling output path: same directory, `<stem><suffix>.<ext>`.
///
/// # Errors
///
/// Returns [`PipelineError::BadInputName`] when `input` has no stem.
pub fn derived_path(input: &Path, suffix: &str, extension: &str) -> PipelineResult<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::BadInputName {
            path: input.to_path_buf(),
        })?;
    let file_name = format!("{stem}{suffix}.{extension}");
    Ok(input.with_file_name(file_name))
}

/// Derive a sibling output path with `strip` removed from the end of
/// the stem when present: same directory, `<stem-without-strip>.<ext>`.
///
/// Used where an intermediate suffix must not leak into downstream
/// names, e.g. `Component3_smoothed.mha` contours to `Component3.vtk`.
///
/// # Errors
///
/// Returns [`PipelineError::BadInputName`] when `input` has no stem.
pub fn stripped_path(input: &Path, strip: &str, extension: &str) -> PipelineResult<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::BadInputName {
            path: input.to_path_buf(),
        })?;
    let stem = stem.strip_suffix(strip).unwrap_or(stem);
    Ok(input.with_file_name(format!("{stem}.{extension}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_list_roundtrip() {
        let input = "/data/a.mha\n\n  /data/b.mha  \n";
        let paths = read_path_list(input.as_bytes()).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("/data/a.mha"), PathBuf::from("/data/b.mha")]
        );

        let artifacts: Vec<ArtifactDescriptor> = paths
            .into_iter()
            .map(|p| ArtifactDescriptor::new(p, PipelineStage::Component))
            .collect();
        let mut out = Vec::new();
        write_path_list(&mut out, &artifacts).unwrap();
        assert_eq!(out, b"/data/a.mha\n/data/b.mha\n");
    }

    #[test]
    fn empty_input_is_empty_list() {
        let paths = read_path_list("".as_bytes()).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn derived_path_stays_in_directory() {
        let path = derived_path(Path::new("/data/Component3.mha"), "_smoothed", "mha").unwrap();
        assert_eq!(path, PathBuf::from("/data/Component3_smoothed.mha"));

        let vtk = derived_path(Path::new("/data/Component3_smoothed.mha"), "", "vtk").unwrap();
        assert_eq!(vtk, PathBuf::from("/data/Component3_smoothed.vtk"));
    }

    #[test]
    fn stripped_path_drops_intermediate_suffix() {
        let path =
            stripped_path(Path::new("/data/Component3_smoothed.mha"), "_smoothed", "vtk").unwrap();
        assert_eq!(path, PathBuf::from("/data/Component3.vtk"));
    }

    #[test]
    fn stripped_path_passes_through_without_suffix() {
        let path = stripped_path(Path::new("/data/scan.mha"), "_smoothed", "vtk").unwrap();
        assert_eq!(path, PathBuf::from("/data/scan.vtk"));
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(PipelineStage::Component.to_string(), "component");
        assert_eq!(PipelineStage::OptimizedMesh.to_string(), "optimized mesh");
    }
}
