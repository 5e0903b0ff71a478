//! Output keys understood by the export callback.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Output keys that are written as a side effect of another export.
///
/// `bin` is the buffer file `GLTF_SEPARATE` writes next to the `.gltf`.
pub const PASSTHROUGH_KEYS: &[&str] = &["bin"];

/// An export variant the callback can request from the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// `.gltf` with separate `.bin` and textures.
    #[serde(rename = "GLTF_SEPARATE")]
    GltfSeparate,
    /// Single binary `.glb`.
    #[serde(rename = "GLB")]
    Glb,
}

impl ExportFormat {
    /// Every supported format.
    pub const ALL: [ExportFormat; 2] = [ExportFormat::GltfSeparate, ExportFormat::Glb];

    /// The output key that selects this format.
    pub fn key(&self) -> &'static str {
        match self {
            ExportFormat::GltfSeparate => "gltf",
            ExportFormat::Glb => "glb",
        }
    }

    /// The value passed as `export_format` to the export operator.
    pub fn selector(&self) -> &'static str {
        match self {
            ExportFormat::GltfSeparate => "GLTF_SEPARATE",
            ExportFormat::Glb => "GLB",
        }
    }

    /// Looks up a format by output key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.key() == key)
    }

    /// Supported output keys, sorted.
    pub fn supported_keys() -> Vec<String> {
        let mut keys: Vec<String> = Self::ALL.iter().map(|f| f.key().to_string()).collect();
        keys.sort();
        keys
    }
}

/// What the callback should do with a declared output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRole {
    /// Invoke the export capability with this format.
    Export(ExportFormat),
    /// Produced by another export; nothing to do.
    Passthrough,
}

impl OutputRole {
    /// Classifies an output key, failing for keys nobody produces.
    pub fn classify(key: &str, path: &Path) -> SpecResult<Self> {
        if PASSTHROUGH_KEYS.contains(&key) {
            return Ok(OutputRole::Passthrough);
        }
        ExportFormat::from_key(key)
            .map(OutputRole::Export)
            .ok_or_else(|| SpecError::UnsupportedOutput {
                key: key.to_string(),
                path: path.to_path_buf(),
                supported: ExportFormat::supported_keys(),
            })
    }
}
