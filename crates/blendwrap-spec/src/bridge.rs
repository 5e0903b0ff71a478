//! The environment bridge between launcher and callback.
//!
//! The application offers no way to pass structured arguments to the script
//! it runs, so the launcher hands them over through the child's environment.
//! The channel is one-shot with exactly two participants: the launcher writes
//! it when building the child environment, the callback reads it once at
//! process start. The sentinel is never present in the launcher's own
//! environment, which is what keeps the callback from launching again.

use std::path::PathBuf;

use crate::error::{SpecError, SpecResult};

/// Set in the child environment only. Its presence selects the callback role.
pub const SENTINEL_VAR: &str = "RULES_BLENDER_RUNNING_UNDER_PROCESS_WRAPPER";

/// Path to the transfer artifact.
pub const ARGS_FILE_VAR: &str = "RULES_BLENDER_ARGS_FILE";

/// Path to the wrapper binary, for the in-application script to re-enter.
pub const WRAPPER_EXE_VAR: &str = "RULES_BLENDER_WRAPPER_EXE";

/// Sentinel value in the artifact-file variant.
const SENTINEL_FILE_MODE: &str = "1";

/// What the launcher hands to the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgePayload {
    /// The transfer artifact lives at this path.
    ArtifactFile(PathBuf),
    /// The launcher argv, embedded directly in the sentinel value.
    InlineArgv(Vec<String>),
}

impl BridgePayload {
    /// Environment entries to add to the child environment.
    pub fn to_env(&self) -> Vec<(String, String)> {
        match self {
            BridgePayload::ArtifactFile(path) => vec![
                (SENTINEL_VAR.to_string(), SENTINEL_FILE_MODE.to_string()),
                (ARGS_FILE_VAR.to_string(), path.display().to_string()),
            ],
            BridgePayload::InlineArgv(argv) => vec![(
                SENTINEL_VAR.to_string(),
                // A Vec<String> always serializes.
                serde_json::to_string(argv).unwrap_or_else(|_| "[]".to_string()),
            )],
        }
    }

    /// Reads the bridge through `lookup`. `None` means no sentinel: not a callback.
    pub fn from_lookup<F>(lookup: F) -> SpecResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(sentinel) = lookup(SENTINEL_VAR) else {
            return Ok(None);
        };

        if sentinel == SENTINEL_FILE_MODE {
            let path = lookup(ARGS_FILE_VAR).ok_or(SpecError::BridgeMissingArgsFile {
                sentinel: SENTINEL_VAR,
                args_file: ARGS_FILE_VAR,
            })?;
            return Ok(Some(BridgePayload::ArtifactFile(PathBuf::from(path))));
        }

        let argv: Vec<String> =
            serde_json::from_str(&sentinel).map_err(|source| SpecError::BridgeDecode {
                sentinel: SENTINEL_VAR,
                source,
            })?;
        Ok(Some(BridgePayload::InlineArgv(argv)))
    }
}
