//! Re-encode an input volume into the working directory.
//!
//! Usage: `convert-volume <input> <out_dir>`
//!
//! The input may be a MetaImage (.mha) or single-file NIfTI-1 (.nii)
//! volume. Writes the converted volume's path to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use model_pipeline::{
    convert_volume, init_tracing, policy_from_env, required_arg, write_path_list, PipelineResult,
};
use tracing::error;

const USAGE: &str = "convert-volume <input> <out_dir>";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "conversion failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(required_arg(&mut args, USAGE)?);
    let out_dir = PathBuf::from(required_arg(&mut args, USAGE)?);

    let mut policy = policy_from_env();
    let artifacts: Vec<_> = convert_volume(&input, &out_dir, policy.as_mut())?
        .into_iter()
        .collect();
    write_path_list(std::io::stdout().lock(), &artifacts)
}
