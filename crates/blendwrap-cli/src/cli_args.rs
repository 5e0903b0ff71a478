//! Launcher command-line arguments.

use clap::Parser;

use blendwrap_process::{BridgeMode, PathResolver, ProcessResult};
use blendwrap_spec::{ExportArguments, InvocationRequest, OutputDeclaration, ReservedKeys};
use blendwrap_spec::request::flags;

/// Run a Blender export as a build action.
#[derive(Debug, Parser)]
#[command(name = "blendwrap")]
#[command(version, about, long_about = None)]
pub struct LaunchArgs {
    /// The path to the Blender binary
    #[arg(long = "blender")]
    pub blender: String,

    /// The path to the script Blender runs on startup
    #[arg(long = "main")]
    pub main: String,

    /// A mapping of `key:path` for an output file or directory (repeatable)
    #[arg(long = "output", value_name = "KEY:PATH")]
    pub outputs: Vec<String>,

    /// The path to the `.blend` file
    #[arg(long = "blend_file")]
    pub blend_file: String,

    /// Arguments to pass to the export function, as a JSON object
    #[arg(long = "export_args", value_name = "JSON")]
    pub export_args: String,

    /// How the arguments reach the script inside Blender
    #[arg(long, default_value = "file", value_parser = ["file", "inline"])]
    pub bridge: String,

    /// Extra arguments for Blender, placed after `--`
    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

impl LaunchArgs {
    /// Parses an argv that does not include the program name.
    pub fn try_parse_argv(argv: &[String]) -> Result<Self, clap::Error> {
        Self::try_parse_from(std::iter::once("blendwrap").chain(argv.iter().map(String::as_str)))
    }

    /// The selected bridge variant.
    pub fn bridge_mode(&self) -> BridgeMode {
        BridgeMode::from_flag(&self.bridge).unwrap_or(BridgeMode::ArtifactFile)
    }

    /// Resolves paths and validates everything else. Nothing is spawned here.
    pub fn into_request(
        self,
        resolver: &PathResolver,
        reserved: &ReservedKeys,
    ) -> ProcessResult<InvocationRequest> {
        let blender = resolver.resolve(flags::BLENDER, &self.blender)?;
        let main = resolver.resolve(flags::MAIN, &self.main)?;
        let blend_file = resolver.resolve(flags::BLEND_FILE, &self.blend_file)?;

        let outputs = self
            .outputs
            .iter()
            .map(|value| value.parse::<OutputDeclaration>())
            .collect::<Result<Vec<_>, _>>()?;
        let export_args = ExportArguments::parse_json(&self.export_args)?;

        let request =
            InvocationRequest::new(blender, main, blend_file, outputs, export_args, reserved)?
                .with_passthrough(self.passthrough);
        Ok(request)
    }
}
