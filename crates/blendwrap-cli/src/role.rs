//! Which of the two roles this process plays.

use blendwrap_spec::{BridgePayload, SpecResult};

/// Chosen once at process start and never revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRole {
    /// Top-level build action: spawn Blender.
    Launcher,
    /// Re-entered from inside Blender: drive the export.
    Callback(BridgePayload),
}

impl ProcessRole {
    /// Selects the role from the sentinel. A sentinel that is present but
    /// unreadable is an error, not a fallback to the launcher.
    pub fn detect<F>(lookup: F) -> SpecResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(match BridgePayload::from_lookup(lookup)? {
            Some(payload) => ProcessRole::Callback(payload),
            None => ProcessRole::Launcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendwrap_spec::{ARGS_FILE_VAR, SENTINEL_VAR};
    use std::path::PathBuf;

    #[test]
    fn test_launcher_without_sentinel() {
        assert_eq!(
            ProcessRole::detect(|_| None).unwrap(),
            ProcessRole::Launcher
        );
    }

    #[test]
    fn test_callback_with_sentinel() {
        let role = ProcessRole::detect(|key| match key {
            SENTINEL_VAR => Some("1".to_string()),
            ARGS_FILE_VAR => Some("/tmp/bzlblend-abc/args.json".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            role,
            ProcessRole::Callback(BridgePayload::ArtifactFile(PathBuf::from(
                "/tmp/bzlblend-abc/args.json"
            )))
        );
    }

    #[test]
    fn test_broken_sentinel_is_an_error() {
        let result = ProcessRole::detect(|key| match key {
            SENTINEL_VAR => Some("1".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }
}
