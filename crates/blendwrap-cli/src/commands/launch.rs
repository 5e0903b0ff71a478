//! The launcher role.
//!
//! Parses and validates the action's arguments, runs Blender once and turns
//! the verdict into this process's exit code.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use blendwrap_process::{
    load_test_args, LaunchReport, Launcher, PathResolver, Runfiles, ScratchState, WrapperConfig,
};

use crate::cli_args::LaunchArgs;

/// Entry point for the launcher role. `argv` excludes the program name.
///
/// Under a test runner the argv comes from the test args file instead and
/// path arguments are runfiles keys.
pub fn run(config: WrapperConfig, argv: Vec<String>) -> Result<ExitCode> {
    let (argv, resolver) = match config.test_args_file.as_deref() {
        Some(key) => {
            let runfiles = Runfiles::create()?;
            let source_repo = config.source_repo.clone();
            let argv = load_test_args(&runfiles, key, source_repo.as_deref())?;
            (
                argv,
                PathResolver::Runfiles {
                    runfiles,
                    source_repo,
                },
            )
        }
        None => (argv, PathResolver::Direct),
    };

    let args = LaunchArgs::try_parse_argv(&argv).unwrap_or_else(|e| e.exit());
    let config = config.bridge_mode(args.bridge_mode());
    let request = args.into_request(&resolver, &config.reserved_keys)?;

    let report = Launcher::new(config).run(&request)?;
    Ok(finish(&report))
}

/// Reports a failed verdict on stderr and picks the exit code.
fn finish(report: &LaunchReport) -> ExitCode {
    let Some(reason) = report.verdict.describe_failure() else {
        return ExitCode::SUCCESS;
    };

    if let Some(output) = &report.output {
        eprint!("{output}");
        if !output.is_empty() && !output.ends_with('\n') {
            eprintln!();
        }
    }
    eprintln!("{}: {}", "error".red(), reason);
    if let ScratchState::Preserved(path) = &report.scratch {
        eprintln!("  scratch directory kept at {}", path.display());
    }

    ExitCode::from(failure_code(report.exit_code()))
}

/// Maps a failure code onto a process exit status. Never returns 0.
fn failure_code(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(code) if code != 0 => code,
        _ => 1,
    }
}
