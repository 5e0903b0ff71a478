//! The launcher-side invocation request.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::arguments::ExportArguments;
use crate::error::{SpecError, SpecResult};
use crate::reserved::ReservedKeys;

/// Launcher flag names. Shared by the CLI parser and [`InvocationRequest::to_argv`].
pub mod flags {
    pub const BLENDER: &str = "--blender";
    pub const MAIN: &str = "--main";
    pub const OUTPUT: &str = "--output";
    pub const BLEND_FILE: &str = "--blend_file";
    pub const EXPORT_ARGS: &str = "--export_args";
}

/// A declared output: which export to run and where its result lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeclaration {
    pub key: String,
    pub path: PathBuf,
}

impl OutputDeclaration {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

impl FromStr for OutputDeclaration {
    type Err = SpecError;

    /// Parses `key:path`. Only the first `:` separates, so paths may contain colons.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((key, path)) if !key.is_empty() && !path.is_empty() => {
                Ok(Self::new(key, path))
            }
            _ => Err(SpecError::InvalidOutputMapping {
                value: value.to_string(),
            }),
        }
    }
}

/// A validated request to run the application once.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    /// The application binary.
    pub blender: PathBuf,
    /// The script the application runs on startup.
    pub main: PathBuf,
    /// The scene file the application opens.
    pub blend_file: PathBuf,
    /// Declared outputs, in command-line order.
    pub outputs: Vec<OutputDeclaration>,
    /// Arguments forwarded to the export capability.
    pub export_args: ExportArguments,
    /// Raw arguments placed after `--` on the child command line.
    pub passthrough: Vec<String>,
}

impl InvocationRequest {
    /// Builds a request, enforcing unique output keys and the denylist.
    pub fn new(
        blender: impl Into<PathBuf>,
        main: impl Into<PathBuf>,
        blend_file: impl Into<PathBuf>,
        outputs: Vec<OutputDeclaration>,
        export_args: ExportArguments,
        reserved: &ReservedKeys,
    ) -> SpecResult<Self> {
        let mut seen = HashSet::new();
        for output in &outputs {
            if !seen.insert(output.key.as_str()) {
                return Err(SpecError::DuplicateOutputKey {
                    key: output.key.clone(),
                });
            }
        }
        reserved.check(&export_args)?;

        Ok(Self {
            blender: blender.into(),
            main: main.into(),
            blend_file: blend_file.into(),
            outputs,
            export_args,
            passthrough: Vec::new(),
        })
    }

    /// Sets the passthrough arguments.
    pub fn with_passthrough(mut self, passthrough: Vec<String>) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Declared output paths.
    pub fn output_paths(&self) -> impl Iterator<Item = &Path> {
        self.outputs.iter().map(|o| o.path.as_path())
    }

    /// The launcher argv that reproduces this request, without the program name.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec![
            flags::BLENDER.to_string(),
            self.blender.display().to_string(),
            flags::MAIN.to_string(),
            self.main.display().to_string(),
            flags::BLEND_FILE.to_string(),
            self.blend_file.display().to_string(),
        ];
        for output in &self.outputs {
            argv.push(flags::OUTPUT.to_string());
            argv.push(format!("{}:{}", output.key, output.path.display()));
        }
        argv.push(flags::EXPORT_ARGS.to_string());
        argv.push(self.export_args.to_json());
        if !self.passthrough.is_empty() {
            argv.push("--".to_string());
            argv.extend(self.passthrough.iter().cloned());
        }
        argv
    }
}
