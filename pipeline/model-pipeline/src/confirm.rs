//! Overwrite confirmation policies.
//!
//! Whether an existing artifact may be replaced is a policy decision
//! injected into the stages, not hardcoded prompting. The environment
//! variable [`CONFIRM_ENV_VAR`] selects a non-interactive policy for
//! scripted runs; without it the user is asked on the terminal.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

/// Environment variable selecting a non-interactive policy:
/// `yes` overwrites everything, `no` declines everything.
pub const CONFIRM_ENV_VAR: &str = "CONFIRM_OVERWRITE";

/// Decides whether an existing file may be overwritten.
pub trait ConfirmPolicy {
    /// Whether `path` may be replaced.
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Overwrite everything without asking.
#[derive(Debug, Default)]
pub struct AlwaysYes;

impl ConfirmPolicy for AlwaysYes {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Decline every overwrite.
#[derive(Debug, Default)]
pub struct AlwaysNo;

impl ConfirmPolicy for AlwaysNo {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        false
    }
}

/// Prompt the user on the controlling terminal.
///
/// Both the prompt and the answer go through `/dev/tty`: stdin carries
/// the path list and stdout the artifact paths, so neither can be used
/// for a dialogue. Without a terminal (or on any read failure) every
/// prompt declines, the safe default for unattended runs.
#[derive(Debug, Default)]
pub struct Interactive;

impl ConfirmPolicy for Interactive {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        let Ok(tty) = File::options().read(true).write(true).open("/dev/tty") else {
            debug!(path = %path.display(), "no controlling terminal, declining overwrite");
            return false;
        };

        let mut prompt = &tty;
        let _ = write!(prompt, "{} exists, overwrite? [y/N] ", path.display());
        let _ = prompt.flush();

        let mut answer = String::new();
        if BufReader::new(&tty).read_line(&mut answer).is_err() {
            return false;
        }
        affirmative(&answer)
    }
}

/// Whether an answer line consents to overwriting.
fn affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Select the policy for this run from [`CONFIRM_ENV_VAR`].
#[must_use]
pub fn policy_from_env() -> Box<dyn ConfirmPolicy> {
    match std::env::var(CONFIRM_ENV_VAR) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => {
                debug!("overwrite policy: always yes");
                Box::new(AlwaysYes)
            }
            "no" | "n" => {
                debug!("overwrite policy: always no");
                Box::new(AlwaysNo)
            }
            _ => Box::new(Interactive),
        },
        Err(_) => Box::new(Interactive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_yes_confirms() {
        assert!(AlwaysYes.confirm_overwrite(Path::new("/tmp/x.mha")));
    }

    #[test]
    fn always_no_declines() {
        assert!(!AlwaysNo.confirm_overwrite(Path::new("/tmp/x.mha")));
    }

    #[test]
    fn only_yes_answers_are_affirmative() {
        assert!(affirmative("y\n"));
        assert!(affirmative("  Yes  \n"));
        assert!(!affirmative("n\n"));
        assert!(!affirmative(""));
        assert!(!affirmative("sure\n"));
    }
}
