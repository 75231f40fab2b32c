//! Smooth component volumes with gradient-limited diffusion.
//!
//! Usage: `smooth-volumes [time_step] [conductance] [iterations]`
//!
//! Reads component volume paths from stdin; writes the
//! `<stem>_smoothed.mha` paths to stdout.

use std::process::ExitCode;

use model_pipeline::{
    init_tracing, positional_param, read_path_list, smooth_component_stage, write_path_list,
    PipelineResult,
};
use tracing::error;
use volume_smooth::SmoothParams;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "volume smoothing failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let mut args = std::env::args().skip(1);
    let defaults = SmoothParams::default();
    let params = SmoothParams {
        time_step: positional_param(&mut args, "time_step", defaults.time_step)?,
        conductance: positional_param(&mut args, "conductance", defaults.conductance)?,
        iterations: positional_param(&mut args, "iterations", defaults.iterations)?,
    };

    let inputs = read_path_list(std::io::stdin().lock())?;
    let mut artifacts = Vec::new();
    for input in &inputs {
        artifacts.push(smooth_component_stage(input, &params)?);
    }
    write_path_list(std::io::stdout().lock(), &artifacts)
}
