//! Pipeline driver for anatomical surface model generation.
//!
//! Turns a labeled segmentation volume into optimized surface meshes
//! through five sequential stages, each available as its own binary:
//!
//! 1. `convert-volume` - re-encode the input volume
//! 2. `extract-components` - per-label binary component volumes
//! 3. `smooth-volumes` - gradient-limited diffusion per component
//! 4. `extract-isosurfaces` - surface-nets contouring per component
//! 5. `optimize-meshes` - six-stage mesh optimization per component
//!
//! Stages communicate by newline-delimited path lists: each binary
//! reads its input paths from stdin, writes its output paths to
//! stdout, and keeps all diagnostics on stderr. A stage producing zero
//! artifacts ends the run successfully; downstream stages simply see
//! an empty list. Runs are strictly sequential and never roll back:
//! artifacts written before a fatal error stay on disk.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod artifact;
mod confirm;
mod error;
mod stages;

pub use artifact::{
    derived_path, read_path_list, stripped_path, write_path_list, ArtifactDescriptor,
    PipelineStage,
};
pub use confirm::{policy_from_env, AlwaysNo, AlwaysYes, ConfirmPolicy, Interactive, CONFIRM_ENV_VAR};
pub use error::{PipelineError, PipelineResult};
pub use stages::{
    convert_volume, extract_components_stage, extract_isosurface_stage, optimize_mesh_stage,
    smooth_component_stage,
};

use std::str::FromStr;

/// Initialise tracing for one stage process: diagnostics to stderr,
/// level from `RUST_LOG` with `info` as the default.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Take the next positional parameter, falling back to `default`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParam`] when the value fails to
/// parse as `T`.
pub fn positional_param<T: FromStr>(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
    default: T,
) -> PipelineResult<T> {
    match args.next() {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| PipelineError::InvalidParam { name, value: raw }),
    }
}

/// Take a required positional parameter.
///
/// # Errors
///
/// Returns [`PipelineError::Usage`] when the argument is missing.
pub fn required_arg(
    args: &mut impl Iterator<Item = String>,
    usage: &str,
) -> PipelineResult<String> {
    args.next().ok_or_else(|| PipelineError::Usage {
        message: usage.to_string(),
    })
}
