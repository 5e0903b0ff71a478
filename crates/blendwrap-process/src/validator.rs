//! Deciding whether an invocation succeeded.
//!
//! Two independent checks must both pass. Blender catches exceptions raised
//! by the `--python` script, prints them, and still exits 0, so the exit code
//! alone says nothing about whether the export ran. The output check is the
//! detector for those failures; it is not redundant with the exit check.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::invocation::exit_code;

/// Exit code reported when the child exited 0 but outputs are missing.
pub const MISSING_OUTPUT_EXIT_CODE: i32 = 1;

/// What the child's exit status says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitCheck {
    Clean,
    Failed { code: i32 },
}

impl ExitCheck {
    pub fn from_status(status: &ExitStatus) -> Self {
        Self::from_code(exit_code(status))
    }

    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ExitCheck::Clean
        } else {
            ExitCheck::Failed { code }
        }
    }
}

/// What the filesystem says about the declared outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCheck {
    AllPresent,
    Missing(Vec<PathBuf>),
}

impl OutputCheck {
    /// Stats every declared output. Files and directories both count.
    pub fn inspect<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let missing: Vec<PathBuf> = paths
            .into_iter()
            .filter(|path| !path.exists())
            .map(Path::to_path_buf)
            .collect();
        if missing.is_empty() {
            OutputCheck::AllPresent
        } else {
            OutputCheck::Missing(missing)
        }
    }
}

/// Both checks, kept side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub exit: ExitCheck,
    pub outputs: OutputCheck,
}

impl Verdict {
    pub fn new(exit: ExitCheck, outputs: OutputCheck) -> Self {
        Self { exit, outputs }
    }

    /// Success requires a clean exit and every declared output on disk.
    pub fn is_success(&self) -> bool {
        self.exit == ExitCheck::Clean && self.outputs == OutputCheck::AllPresent
    }

    /// The launcher's exit code. A non-zero child code wins over missing outputs.
    pub fn exit_code(&self) -> i32 {
        match (&self.exit, &self.outputs) {
            (ExitCheck::Failed { code }, _) => *code,
            (ExitCheck::Clean, OutputCheck::Missing(_)) => MISSING_OUTPUT_EXIT_CODE,
            (ExitCheck::Clean, OutputCheck::AllPresent) => 0,
        }
    }

    /// A one-line explanation of a failure.
    pub fn describe_failure(&self) -> Option<String> {
        match (&self.exit, &self.outputs) {
            (ExitCheck::Failed { code }, _) => {
                Some(format!("Blender exited with status {code}"))
            }
            (ExitCheck::Clean, OutputCheck::Missing(missing)) => {
                let paths: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
                Some(format!(
                    "Blender exited with status 0 but declared outputs are missing: {}",
                    paths.join(", ")
                ))
            }
            (ExitCheck::Clean, OutputCheck::AllPresent) => None,
        }
    }
}
