//! The callback role.
//!
//! Blender runs the `--python` script, which re-enters this binary with the
//! bridge in its environment. The callback reads the bridge, validates it the
//! same way the launcher did, and asks the export capability for one export
//! per declared output. Any export error ends the process; Blender will not
//! reflect that in its exit code, which is why the launcher checks outputs.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use blendwrap_process::PathResolver;
use blendwrap_spec::{
    BridgePayload, ExportArguments, ExportFormat, OutputRole, ReservedKeys, SpecError,
    TransferArtifact,
};

use crate::cli_args::LaunchArgs;

/// One request to the application's export operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCall {
    pub format: ExportFormat,
    pub filepath: PathBuf,
    pub arguments: ExportArguments,
}

impl ExportCall {
    /// Keyword arguments for the operator: the export arguments plus
    /// `filepath` and `export_format`. Neither can collide, both are reserved.
    pub fn keyword_args(&self) -> Map<String, Value> {
        let mut kwargs = self.arguments.as_map().clone();
        kwargs.insert(
            "filepath".to_string(),
            Value::String(self.filepath.display().to_string()),
        );
        kwargs.insert(
            "export_format".to_string(),
            Value::String(self.format.selector().to_string()),
        );
        kwargs
    }
}

/// Something that can perform an export.
pub trait ExportCapability {
    fn export(&mut self, call: &ExportCall) -> Result<()>;
}

/// Writes each export call as one line of JSON keyword arguments.
///
/// `blender/export_callback.py` reads these lines and calls
/// `bpy.ops.export_scene.gltf(**kwargs)` for each.
pub struct PlanWriter<W: Write> {
    out: W,
}

impl<W: Write> PlanWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ExportCapability for PlanWriter<W> {
    fn export(&mut self, call: &ExportCall) -> Result<()> {
        serde_json::to_writer(&mut self.out, &call.keyword_args())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Summary of a dispatch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub exported: Vec<String>,
    pub skipped: Vec<String>,
}

/// Loads and re-validates whatever the launcher put on the bridge.
pub fn load_artifact(payload: &BridgePayload, reserved: &ReservedKeys) -> Result<TransferArtifact> {
    match payload {
        BridgePayload::ArtifactFile(path) => {
            let artifact = TransferArtifact::read_from(path)?;
            artifact.validate(reserved)?;
            Ok(artifact)
        }
        BridgePayload::InlineArgv(argv) => {
            let args = LaunchArgs::try_parse_argv(argv)
                .context("Failed to parse the inline argument vector")?;
            let request = args.into_request(&PathResolver::Direct, reserved)?;
            Ok(TransferArtifact::from_request(&request))
        }
    }
}

/// Runs one export per declared output.
///
/// Every key is classified before the first export, so an unknown key fails
/// the callback without producing anything.
pub fn dispatch(
    artifact: &TransferArtifact,
    capability: &mut dyn ExportCapability,
) -> Result<DispatchReport> {
    if artifact.outputs.is_empty() {
        return Err(SpecError::NoOutputs.into());
    }

    let mut planned = Vec::with_capacity(artifact.outputs.len());
    for (key, path) in &artifact.outputs {
        planned.push((key, path, OutputRole::classify(key, path)?));
    }

    let mut report = DispatchReport::default();
    for (key, path, role) in planned {
        match role {
            OutputRole::Passthrough => {
                tracing::debug!("Skipping `{}`: written by another export", key);
                report.skipped.push(key.clone());
            }
            OutputRole::Export(format) => {
                let call = ExportCall {
                    format,
                    filepath: std::path::absolute(path).unwrap_or_else(|_| path.clone()),
                    arguments: artifact.arguments.clone(),
                };
                tracing::info!(
                    "Exporting `{}` as {} to {}",
                    key,
                    format.selector(),
                    call.filepath.display()
                );
                capability
                    .export(&call)
                    .with_context(|| format!("Export of `{}` to {} failed", key, path.display()))?;
                report.exported.push(key.clone());
            }
        }
    }
    Ok(report)
}

/// Entry point for the callback role. The plan goes to stdout.
pub fn run(payload: &BridgePayload, reserved: &ReservedKeys) -> Result<ExitCode> {
    let artifact = load_artifact(payload, reserved)?;
    let stdout = std::io::stdout();
    let mut writer = PlanWriter::new(stdout.lock());
    let report = dispatch(&artifact, &mut writer)?;
    tracing::debug!(
        "Callback done: exported {:?}, skipped {:?}",
        report.exported,
        report.skipped
    );
    Ok(ExitCode::SUCCESS)
}
