//! Child command construction and synchronous launch.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use blendwrap_spec::{BridgePayload, InvocationRequest, ARGS_FILE_VAR, SENTINEL_VAR, WRAPPER_EXE_VAR};

use crate::config::OutputMode;
use crate::error::{ProcessError, ProcessResult};

/// Flags forcing a headless run that never touches the network.
pub const HEADLESS_FLAGS: &[&str] = &["--offline-mode", "--background"];

/// Flag telling the application which script to run on startup.
pub const RUN_SCRIPT_FLAG: &str = "--python";

/// A fully described child invocation.
#[derive(Debug, Clone)]
pub struct ChildInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    bridge_env: Vec<(String, String)>,
}

/// What the child left behind.
#[derive(Debug)]
pub struct ChildOutcome {
    /// How the child exited.
    pub status: ExitStatus,
    /// Combined stdout/stderr, when buffered.
    pub output: Option<String>,
}

impl ChildInvocation {
    /// Describes `<blender> <blend_file> <headless flags> --python <main> [-- <passthrough>]`
    /// with the bridge added to the inherited environment.
    pub fn new(
        request: &InvocationRequest,
        payload: &BridgePayload,
        callback_exe: Option<&Path>,
    ) -> Self {
        let mut args: Vec<OsString> = vec![request.blend_file.clone().into_os_string()];
        args.extend(HEADLESS_FLAGS.iter().map(OsString::from));
        args.push(RUN_SCRIPT_FLAG.into());
        args.push(request.main.clone().into_os_string());
        if !request.passthrough.is_empty() {
            args.push("--".into());
            args.extend(request.passthrough.iter().map(OsString::from));
        }

        let mut bridge_env = payload.to_env();
        if let Some(exe) = callback_exe {
            bridge_env.push((WRAPPER_EXE_VAR.to_string(), exe.display().to_string()));
        }

        Self {
            program: request.blender.clone(),
            args,
            bridge_env,
        }
    }

    /// The application binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Variables added on top of the inherited environment.
    pub fn bridge_env(&self) -> &[(String, String)] {
        &self.bridge_env
    }

    /// Space-joined command line, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds the command. Stale bridge variables are scrubbed before the
    /// current payload is applied.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env_remove(SENTINEL_VAR)
            .env_remove(ARGS_FILE_VAR)
            .env_remove(WRAPPER_EXE_VAR)
            .envs(self.bridge_env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        cmd
    }

    /// Runs the child to completion.
    pub fn run(&self, mode: OutputMode) -> ProcessResult<ChildOutcome> {
        tracing::debug!("Command: `{}`", self.command_line());
        match mode {
            OutputMode::Stream => self.run_streaming(),
            OutputMode::Buffered => self.run_buffered(),
        }
    }

    fn run_streaming(&self) -> ProcessResult<ChildOutcome> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        let mut child = cmd.spawn().map_err(|source| self.spawn_failed(source))?;
        let status = child.wait().map_err(ProcessError::WaitFailed)?;
        Ok(ChildOutcome {
            status,
            output: None,
        })
    }

    fn run_buffered(&self) -> ProcessResult<ChildOutcome> {
        // One pipe for both streams keeps the child's own interleaving.
        let (mut reader, writer) = std::io::pipe().map_err(ProcessError::PipeFailed)?;
        let writer_err = writer.try_clone().map_err(ProcessError::PipeFailed)?;

        let mut cmd = self.command();
        cmd.stdout(writer).stderr(writer_err);
        let mut child = cmd.spawn().map_err(|source| self.spawn_failed(source))?;
        // The command still holds our copies of the write end; the pipe only
        // reaches EOF once they are closed.
        drop(cmd);

        let mut buf = Vec::new();
        let read = reader.read_to_end(&mut buf);
        let status = child.wait().map_err(ProcessError::WaitFailed)?;
        read.map_err(ProcessError::WaitFailed)?;

        Ok(ChildOutcome {
            status,
            output: Some(String::from_utf8_lossy(&buf).into_owned()),
        })
    }

    fn spawn_failed(&self, source: std::io::Error) -> ProcessError {
        ProcessError::SpawnFailed {
            program: self.program.clone(),
            source,
        }
    }
}

/// The exit code to report for `status`.
///
/// A child killed by a signal reports `128 + signal`.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendwrap_spec::{ExportArguments, OutputDeclaration, ReservedKeys};
    use pretty_assertions::assert_eq;

    fn request() -> InvocationRequest {
        InvocationRequest::new(
            "/opt/blender/blender",
            "export_callback.py",
            "scene.blend",
            vec![OutputDeclaration::new("glb", "out/scene.glb")],
            ExportArguments::default(),
            &ReservedKeys::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_command_line_shape() {
        let payload = BridgePayload::ArtifactFile(PathBuf::from("/tmp/bzlblend-1/args.json"));
        let invocation = ChildInvocation::new(&request(), &payload, None);

        assert_eq!(invocation.program(), Path::new("/opt/blender/blender"));
        assert_eq!(
            invocation.command_line(),
            "/opt/blender/blender scene.blend --offline-mode --background --python export_callback.py"
        );
    }

    #[test]
    fn test_passthrough_after_separator() {
        let request = request().with_passthrough(vec!["--debug-python".to_string()]);
        let payload = BridgePayload::InlineArgv(request.to_argv());
        let invocation = ChildInvocation::new(&request, &payload, None);

        let args: Vec<_> = invocation
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(&args[args.len() - 2..], ["--", "--debug-python"]);
    }

    #[test]
    fn test_bridge_env_on_command() {
        let payload = BridgePayload::ArtifactFile(PathBuf::from("/tmp/bzlblend-1/args.json"));
        let invocation =
            ChildInvocation::new(&request(), &payload, Some(Path::new("/bin/blendwrap")));

        let cmd = invocation.command();
        let envs: Vec<_> = cmd
            .get_envs()
            .filter_map(|(k, v)| Some((k.to_str()?.to_string(), v?.to_str()?.to_string())))
            .collect();
        assert!(envs.contains(&(SENTINEL_VAR.to_string(), "1".to_string())));
        assert!(envs.contains(&(
            ARGS_FILE_VAR.to_string(),
            "/tmp/bzlblend-1/args.json".to_string()
        )));
        assert!(envs.contains(&(WRAPPER_EXE_VAR.to_string(), "/bin/blendwrap".to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn test_buffered_run_combines_streams() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-blender");
        std::fs::write(&script, "#!/bin/sh\necho out\necho err 1>&2\nexit 3\n").unwrap();
        make_executable(&script);

        let mut request = request();
        request.blender = script;
        let payload = BridgePayload::ArtifactFile(dir.path().join("args.json"));
        let outcome = ChildInvocation::new(&request, &payload, None)
            .run(OutputMode::Buffered)
            .unwrap();

        assert_eq!(exit_code(&outcome.status), 3);
        let output = outcome.output.unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_child_sees_bridge_env() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-blender");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"sentinel=$RULES_BLENDER_RUNNING_UNDER_PROCESS_WRAPPER\"\necho \"file=$RULES_BLENDER_ARGS_FILE\"\n",
        )
        .unwrap();
        make_executable(&script);

        let mut request = request();
        request.blender = script;
        let payload = BridgePayload::ArtifactFile(PathBuf::from("/scratch/args.json"));
        let outcome = ChildInvocation::new(&request, &payload, None)
            .run(OutputMode::Buffered)
            .unwrap();

        assert!(outcome.status.success());
        let output = outcome.output.unwrap();
        assert!(output.contains("sentinel=1"));
        assert!(output.contains("file=/scratch/args.json"));
    }

    #[test]
    fn test_spawn_failure() {
        let mut request = request();
        request.blender = PathBuf::from("/definitely/not/a/blender");
        let payload = BridgePayload::InlineArgv(vec![]);
        let err = ChildInvocation::new(&request, &payload, None)
            .run(OutputMode::Buffered)
            .unwrap_err();
        assert!(matches!(err, ProcessError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
