//! Error types for the launcher.

use blendwrap_spec::{CodedError, SpecError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for launcher operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors that can occur before, while, or after running the child.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A required path argument does not exist.
    #[error("Path given to {flag} does not exist: {path}")]
    PathNotFound { flag: String, path: PathBuf },

    /// No runfiles manifest or directory could be located.
    #[error("Failed to locate runfiles: set RUNFILES_MANIFEST_FILE or RUNFILES_DIR")]
    RunfilesUnavailable,

    /// Failed to read the runfiles manifest or repo mapping.
    #[error("Failed to read runfiles index {path}: {source}")]
    RunfilesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key is not part of the managed file space.
    #[error("Failed to find runfile: {key}")]
    RunfileNotFound { key: String },

    /// The key maps to a path that does not exist.
    #[error("Runfile does not exist: ({key}) {path}")]
    RunfileMissing { key: String, path: PathBuf },

    /// Failed to read the test-mode argument file.
    #[error("Failed to read test args file {path}: {source}")]
    TestArgsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to allocate the scratch directory.
    #[error("Failed to create scratch directory under {root}: {source}")]
    ScratchCreate {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the scratch directory after a successful run.
    #[error("Failed to remove scratch directory {path}: {source}")]
    ScratchCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set up the child's output pipe.
    #[error("Failed to create output pipe: {0}")]
    PipeFailed(#[source] std::io::Error),

    /// Failed to spawn the application.
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to wait for the application to exit.
    #[error("Failed to wait for child process: {0}")]
    WaitFailed(#[source] std::io::Error),

    /// Request or bridge error.
    #[error(transparent)]
    Spec(#[from] SpecError),
}

impl ProcessError {
    /// Creates a new path not found error.
    pub fn path_not_found(flag: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound {
            flag: flag.into(),
            path: path.into(),
        }
    }
}

impl CodedError for ProcessError {
    fn code(&self) -> &'static str {
        match self {
            ProcessError::PathNotFound { .. } => "PROCESS_001",
            ProcessError::RunfilesUnavailable => "PROCESS_002",
            ProcessError::RunfilesRead { .. } => "PROCESS_003",
            ProcessError::RunfileNotFound { .. } => "PROCESS_004",
            ProcessError::RunfileMissing { .. } => "PROCESS_005",
            ProcessError::TestArgsRead { .. } => "PROCESS_006",
            ProcessError::ScratchCreate { .. } => "PROCESS_007",
            ProcessError::ScratchCleanup { .. } => "PROCESS_008",
            ProcessError::PipeFailed(_) => "PROCESS_009",
            ProcessError::SpawnFailed { .. } => "PROCESS_010",
            ProcessError::WaitFailed(_) => "PROCESS_011",
            ProcessError::Spec(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ProcessError::Spec(inner) => inner.category(),
            _ => "process",
        }
    }
}
