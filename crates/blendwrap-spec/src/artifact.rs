//! The transfer artifact: `{outputs, arguments}` handed from launcher to callback.
//!
//! The launcher writes it once into its private scratch directory and the
//! callback reads it once. The file is written next to its final name and
//! renamed into place, so a reader never sees a truncated document.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::arguments::ExportArguments;
use crate::error::{SpecError, SpecResult};
use crate::request::InvocationRequest;
use crate::reserved::ReservedKeys;

/// File name of the artifact inside the scratch directory.
pub const ARTIFACT_FILE_NAME: &str = "args.json";

/// The serialized launcher → callback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferArtifact {
    /// Output key → output path. A key listed twice is a decode error.
    #[serde(deserialize_with = "deserialize_unique_outputs")]
    pub outputs: BTreeMap<String, PathBuf>,
    /// Export arguments, forwarded verbatim.
    pub arguments: ExportArguments,
}

impl TransferArtifact {
    /// Captures the outputs and arguments of a validated request.
    pub fn from_request(request: &InvocationRequest) -> Self {
        Self {
            outputs: request
                .outputs
                .iter()
                .map(|o| (o.key.clone(), o.path.clone()))
                .collect(),
            arguments: request.export_args.clone(),
        }
    }

    /// Re-checks what the launcher checked. The callback never trusts the bridge.
    pub fn validate(&self, reserved: &ReservedKeys) -> SpecResult<()> {
        reserved.check(&self.arguments)
    }

    /// Serializes with 4-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> SpecResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser).map_err(SpecError::ArtifactEncode)?;
        buf.push(b'\n');
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the artifact into `dir` and returns its path.
    pub fn write_to(&self, dir: &Path) -> SpecResult<PathBuf> {
        let path = dir.join(ARTIFACT_FILE_NAME);
        let write_err = |source| SpecError::ArtifactWrite {
            path: path.clone(),
            source,
        };

        let content = self.to_pretty_json()?;
        let mut staged = tempfile::Builder::new()
            .prefix(".args-")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(write_err)?;
        staged.write_all(content.as_bytes()).map_err(write_err)?;
        staged.flush().map_err(write_err)?;
        staged.persist(&path).map_err(|e| write_err(e.error))?;

        Ok(path)
    }

    /// Reads an artifact written by [`TransferArtifact::write_to`].
    pub fn read_from(path: &Path) -> SpecResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SpecError::ArtifactDecode {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn deserialize_unique_outputs<'de, D>(deserializer: D) -> Result<BTreeMap<String, PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, MapAccess, Visitor};

    struct UniqueOutputsVisitor;

    impl<'de> Visitor<'de> for UniqueOutputsVisitor {
        type Value = BTreeMap<String, PathBuf>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a map of output key to path")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut outputs = BTreeMap::new();
            while let Some((key, path)) = access.next_entry::<String, PathBuf>()? {
                if outputs.contains_key(&key) {
                    return Err(de::Error::custom(format!(
                        "output key `{key}` is declared more than once"
                    )));
                }
                outputs.insert(key, path);
            }
            Ok(outputs)
        }
    }

    deserializer.deserialize_map(UniqueOutputsVisitor)
}
