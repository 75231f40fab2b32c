//! Extract per-label binary components from labeled volumes.
//!
//! Usage: `extract-components <out_dir> [min_voxel_count]`
//!
//! Reads labeled volume paths from stdin, one per line; writes the
//! extracted `Component<N>.mha` paths to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use model_pipeline::{
    extract_components_stage, init_tracing, policy_from_env, positional_param, read_path_list,
    required_arg, write_path_list, PipelineResult,
};
use tracing::error;

const USAGE: &str = "extract-components <out_dir> [min_voxel_count]";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "component extraction failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(required_arg(&mut args, USAGE)?);
    let min_voxel_count: usize = positional_param(&mut args, "min_voxel_count", 0)?;

    let inputs = read_path_list(std::io::stdin().lock())?;
    let mut policy = policy_from_env();

    let mut artifacts = Vec::new();
    for input in &inputs {
        artifacts.extend(extract_components_stage(
            input,
            min_voxel_count,
            &out_dir,
            policy.as_mut(),
        )?);
    }
    write_path_list(std::io::stdout().lock(), &artifacts)
}
