//! The launcher role: scratch directory, bridge, child, verdict.

use std::path::PathBuf;

use blendwrap_spec::{BridgePayload, InvocationRequest, TransferArtifact};

use crate::config::{BridgeMode, WrapperConfig};
use crate::error::ProcessResult;
use crate::invocation::ChildInvocation;
use crate::scratch::ScratchDir;
use crate::validator::{ExitCheck, OutputCheck, Verdict};

/// What happened to the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScratchState {
    Removed,
    Preserved(PathBuf),
}

/// Result of one launch.
#[derive(Debug)]
pub struct LaunchReport {
    /// Both success checks.
    pub verdict: Verdict,
    /// Combined child output, when buffered.
    pub output: Option<String>,
    /// Scratch directory fate.
    pub scratch: ScratchState,
}

impl LaunchReport {
    pub fn is_success(&self) -> bool {
        self.verdict.is_success()
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }
}

/// Runs the application once per request.
#[derive(Debug, Clone)]
pub struct Launcher {
    config: WrapperConfig,
}

impl Launcher {
    /// Creates a launcher with the given configuration.
    pub fn new(config: WrapperConfig) -> Self {
        Self { config }
    }

    /// Launches the application for `request` and judges the result.
    ///
    /// The scratch directory is removed only when the verdict is a success.
    /// Any failure, including errors that prevent the child from running,
    /// leaves it on disk.
    pub fn run(&self, request: &InvocationRequest) -> ProcessResult<LaunchReport> {
        let scratch = ScratchDir::create(&self.config.scratch_root())?;

        let (verdict, output) = match self.run_in(&scratch, request) {
            Ok(result) => result,
            Err(e) => {
                scratch.preserve();
                return Err(e);
            }
        };

        let scratch = if verdict.is_success() {
            scratch.cleanup()?;
            ScratchState::Removed
        } else {
            ScratchState::Preserved(scratch.preserve())
        };

        Ok(LaunchReport {
            verdict,
            output,
            scratch,
        })
    }

    fn run_in(
        &self,
        scratch: &ScratchDir,
        request: &InvocationRequest,
    ) -> ProcessResult<(Verdict, Option<String>)> {
        let payload = self.payload(scratch, request)?;
        tracing::debug!("Bridge: {:?}", payload);

        let invocation =
            ChildInvocation::new(request, &payload, self.config.callback_exe.as_deref());
        let outcome = invocation.run(self.config.output_mode)?;

        let verdict = Verdict::new(
            ExitCheck::from_status(&outcome.status),
            OutputCheck::inspect(request.output_paths()),
        );
        tracing::info!(
            "Blender finished: exit={:?} outputs={:?}",
            verdict.exit,
            verdict.outputs
        );

        Ok((verdict, outcome.output))
    }

    fn payload(
        &self,
        scratch: &ScratchDir,
        request: &InvocationRequest,
    ) -> ProcessResult<BridgePayload> {
        match self.config.bridge_mode {
            BridgeMode::ArtifactFile => {
                let path = TransferArtifact::from_request(request).write_to(scratch.path())?;
                Ok(BridgePayload::ArtifactFile(path))
            }
            BridgeMode::InlineArgv => Ok(BridgePayload::InlineArgv(request.to_argv())),
        }
    }
}
