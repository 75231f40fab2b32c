//! Optimize raw isosurface meshes into clean surface models.
//!
//! Usage: `optimize-meshes [merge_tolerance] [artifact_min_cells]
//! [decimate_fraction] [smooth_iterations] [smooth_relaxation]
//! [hole_max_size]`
//!
//! Reads mesh paths from stdin; writes the `<stem>_optimized.vtk`
//! paths to stdout. A mesh that fails optimization is skipped; a mesh
//! that fails to load or write aborts the run.

use std::process::ExitCode;

use model_pipeline::{
    init_tracing, optimize_mesh_stage, positional_param, read_path_list, write_path_list,
    PipelineResult,
};
use tin_optimize::OptimizeParams;
use tracing::error;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "mesh optimization failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let mut args = std::env::args().skip(1);
    let defaults = OptimizeParams::default();
    let params = OptimizeParams {
        merge_tolerance: positional_param(&mut args, "merge_tolerance", defaults.merge_tolerance)?,
        artifact_min_cells: positional_param(
            &mut args,
            "artifact_min_cells",
            defaults.artifact_min_cells,
        )?,
        decimate_fraction: positional_param(
            &mut args,
            "decimate_fraction",
            defaults.decimate_fraction,
        )?,
        smooth_iterations: positional_param(
            &mut args,
            "smooth_iterations",
            defaults.smooth_iterations,
        )?,
        smooth_relaxation: positional_param(
            &mut args,
            "smooth_relaxation",
            defaults.smooth_relaxation,
        )?,
        hole_max_size: positional_param(&mut args, "hole_max_size", defaults.hole_max_size)?,
    };

    let inputs = read_path_list(std::io::stdin().lock())?;
    let mut artifacts = Vec::new();
    for input in &inputs {
        artifacts.extend(optimize_mesh_stage(input, &params)?);
    }
    write_path_list(std::io::stdout().lock(), &artifacts)
}
