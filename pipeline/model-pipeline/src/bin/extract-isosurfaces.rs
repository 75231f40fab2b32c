//! Contour smoothed component volumes into surface meshes.
//!
//! Usage: `extract-isosurfaces [iso]`
//!
//! Reads smoothed volume paths from stdin; writes the mesh paths to
//! stdout, named after the component with the `_smoothed` suffix
//! dropped (`Component<N>_smoothed.mha` yields `Component<N>.vtk`).
//! Volumes with no surface at the iso level produce no artifact.

use std::process::ExitCode;

use model_pipeline::{
    extract_isosurface_stage, init_tracing, positional_param, read_path_list, write_path_list,
    PipelineResult,
};
use tracing::error;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "isosurface extraction failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let mut args = std::env::args().skip(1);
    let iso: f64 = positional_param(&mut args, "iso", 0.5)?;

    let inputs = read_path_list(std::io::stdin().lock())?;
    let mut artifacts = Vec::new();
    for input in &inputs {
        artifacts.extend(extract_isosurface_stage(input, iso)?);
    }
    write_path_list(std::io::stdout().lock(), &artifacts)
}
