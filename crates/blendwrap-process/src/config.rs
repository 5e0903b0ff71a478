//! Launcher configuration.
//!
//! Everything the launcher would otherwise read from the process environment
//! is read once, here, and threaded through explicitly.

use std::path::PathBuf;

use blendwrap_spec::ReservedKeys;

/// Enables debug logging when present.
pub const DEBUG_VAR: &str = "RULES_BLENDER_DEBUG";

/// Managed-space key of a file holding the launcher argv, one per line.
pub const TEST_ARGS_FILE_VAR: &str = "RULES_BLENDER_TEST_ARGS_FILE";

/// Scratch-directory root override provided by the test runner.
pub const TEST_TMPDIR_VAR: &str = "TEST_TMPDIR";

/// Source repository for runfiles repo mapping.
pub const TEST_WORKSPACE_VAR: &str = "TEST_WORKSPACE";

/// What happens to the child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Both streams share one pipe, buffered in memory and only shown on failure.
    Buffered,
    /// Both streams are inherited and appear live.
    Stream,
}

/// How the bridge payload reaches the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMode {
    /// A transfer artifact in the scratch directory.
    ArtifactFile,
    /// The canonical argv, JSON-encoded into the sentinel.
    InlineArgv,
}

impl BridgeMode {
    /// Parses the `--bridge` flag value.
    pub fn from_flag(value: &str) -> Option<Self> {
        match value {
            "file" => Some(BridgeMode::ArtifactFile),
            "inline" => Some(BridgeMode::InlineArgv),
            _ => None,
        }
    }
}

/// Configuration for the launcher.
#[derive(Debug, Clone)]
pub struct WrapperConfig {
    /// Root under which scratch directories are created. `None` uses the system temp dir.
    pub temp_root: Option<PathBuf>,
    /// Whether debug logging was requested.
    pub debug: bool,
    /// Test-mode argument file key, if running under a test runner.
    pub test_args_file: Option<String>,
    /// Source repository for runfiles repo mapping.
    pub source_repo: Option<String>,
    /// Child output handling.
    pub output_mode: OutputMode,
    /// Bridge variant.
    pub bridge_mode: BridgeMode,
    /// Wrapper binary advertised to the callback script.
    pub callback_exe: Option<PathBuf>,
    /// Export-argument denylist.
    pub reserved_keys: ReservedKeys,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            debug: false,
            test_args_file: None,
            source_repo: None,
            output_mode: OutputMode::Buffered,
            bridge_mode: BridgeMode::ArtifactFile,
            callback_exe: None,
            reserved_keys: ReservedKeys::default(),
        }
    }
}

impl WrapperConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
            .callback_exe_opt(std::env::current_exe().ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// Test mode streams child output instead of buffering it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let test_args_file = lookup(TEST_ARGS_FILE_VAR);
        let output_mode = if test_args_file.is_some() {
            OutputMode::Stream
        } else {
            OutputMode::Buffered
        };

        Self {
            temp_root: lookup(TEST_TMPDIR_VAR).map(PathBuf::from),
            debug: lookup(DEBUG_VAR).is_some(),
            test_args_file,
            source_repo: lookup(TEST_WORKSPACE_VAR),
            output_mode,
            ..Default::default()
        }
    }

    /// Returns true when running under a test runner.
    pub fn is_test(&self) -> bool {
        self.test_args_file.is_some()
    }

    /// Sets the scratch-directory root.
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Sets the output mode.
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Sets the bridge variant.
    pub fn bridge_mode(mut self, mode: BridgeMode) -> Self {
        self.bridge_mode = mode;
        self
    }

    /// Sets the wrapper binary advertised to the callback script.
    pub fn callback_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.callback_exe = Some(exe.into());
        self
    }

    fn callback_exe_opt(mut self, exe: Option<PathBuf>) -> Self {
        self.callback_exe = exe;
        self
    }

    /// Replaces the export-argument denylist.
    pub fn reserved_keys(mut self, keys: ReservedKeys) -> Self {
        self.reserved_keys = keys;
        self
    }

    /// The effective scratch-directory root.
    pub fn scratch_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}
