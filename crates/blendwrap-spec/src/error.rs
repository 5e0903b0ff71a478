//! Error types for request validation and bridge decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Common trait for wrapper errors.
///
/// Every error enum in the workspace implements this so the binary can
/// report a stable code alongside the human-readable message.
///
/// # Example
///
/// ```
/// use blendwrap_spec::error::{CodedError, SpecError};
///
/// let err = SpecError::DuplicateOutputKey { key: "glb".to_string() };
/// assert_eq!(err.code(), "SPEC_005");
/// assert_eq!(err.category(), "spec");
/// ```
pub trait CodedError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "SPEC_001" or "PROCESS_004". These codes
    /// are stable and can be matched on by callers.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category, e.g. "spec" or "process".
    fn category(&self) -> &'static str;
}

/// Errors raised while validating a request or decoding the bridge.
#[derive(Debug, Error)]
pub enum SpecError {
    /// `--export_args` is not valid JSON.
    #[error("Failed to decode export arguments as JSON: {0}")]
    InvalidExportArgs(#[source] serde_json::Error),

    /// `--export_args` decoded to something other than an object.
    #[error("Export arguments must be a JSON object, found {found}")]
    ExportArgsNotObject { found: &'static str },

    /// An export argument collides with a key the wrapper injects itself.
    #[error("Illegal export argument `{key}`: reserved keys are {reserved:?}")]
    ReservedExportArg { key: String, reserved: Vec<String> },

    /// An `--output` value is not of the form `key:path`.
    #[error("Invalid output mapping `{value}`: expected `key:path`")]
    InvalidOutputMapping { value: String },

    /// The same output key was declared twice.
    #[error("Output key `{key}` is declared more than once")]
    DuplicateOutputKey { key: String },

    /// An output key names neither an export format nor a pass-through.
    #[error("Output `{key}` ({path}) is not a supported output: {supported:?}")]
    UnsupportedOutput {
        key: String,
        path: PathBuf,
        supported: Vec<String>,
    },

    /// The transfer artifact declares no outputs to export.
    #[error("No outputs defined in the transfer artifact")]
    NoOutputs,

    /// Failed to serialize the transfer artifact.
    #[error("Failed to serialize transfer artifact: {0}")]
    ArtifactEncode(#[source] serde_json::Error),

    /// Failed to write the transfer artifact.
    #[error("Failed to write transfer artifact to {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the transfer artifact.
    #[error("Failed to read transfer artifact from {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transfer artifact is not a valid `{outputs, arguments}` document.
    #[error("Failed to parse transfer artifact {path}: {source}")]
    ArtifactDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The sentinel says "artifact file" but no artifact path was provided.
    #[error("{sentinel} is set but {args_file} is missing")]
    BridgeMissingArgsFile {
        sentinel: &'static str,
        args_file: &'static str,
    },

    /// The sentinel carries an inline argv that is not a JSON string array.
    #[error("Failed to decode inline argument vector from {sentinel}: {source}")]
    BridgeDecode {
        sentinel: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SpecError {
    /// Creates a new reserved export argument error.
    pub fn reserved_export_arg(key: impl Into<String>, reserved: Vec<String>) -> Self {
        Self::ReservedExportArg {
            key: key.into(),
            reserved,
        }
    }
}

impl CodedError for SpecError {
    fn code(&self) -> &'static str {
        match self {
            SpecError::InvalidExportArgs(_) => "SPEC_001",
            SpecError::ExportArgsNotObject { .. } => "SPEC_002",
            SpecError::ReservedExportArg { .. } => "SPEC_003",
            SpecError::InvalidOutputMapping { .. } => "SPEC_004",
            SpecError::DuplicateOutputKey { .. } => "SPEC_005",
            SpecError::UnsupportedOutput { .. } => "SPEC_006",
            SpecError::NoOutputs => "SPEC_007",
            SpecError::ArtifactEncode(_) => "SPEC_008",
            SpecError::ArtifactWrite { .. } => "SPEC_009",
            SpecError::ArtifactRead { .. } => "SPEC_010",
            SpecError::ArtifactDecode { .. } => "SPEC_011",
            SpecError::BridgeMissingArgsFile { .. } => "SPEC_012",
            SpecError::BridgeDecode { .. } => "SPEC_013",
        }
    }

    fn category(&self) -> &'static str {
        "spec"
    }
}
