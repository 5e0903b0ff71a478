//! Blendwrap Launcher
//!
//! Runs Blender as a build action and turns its unreliable exit status into
//! one a build system can trust.
//!
//! # Architecture
//!
//! 1. **Scratch directory** - a fresh `bzlblend-*` directory per invocation
//! 2. **Bridge** - the transfer artifact is written there and its path is
//!    added to the child environment together with the sentinel
//! 3. **Child** - `blender <scene> --offline-mode --background --python <main>`
//!    runs to completion; output is buffered unless streaming was requested
//! 4. **Verdict** - exit status and declared outputs are checked separately;
//!    both must pass
//! 5. **Cleanup** - the scratch directory is removed only on success
//!
//! # Crate Structure
//!
//! - [`config`] - launcher configuration read once from the environment
//! - [`runfiles`] - path argument resolution, plain or through runfiles
//! - [`scratch`] - per-invocation scratch directories
//! - [`invocation`] - child command construction and launch
//! - [`validator`] - the exit and output checks
//! - [`launcher`] - the launcher role
//! - [`error`] - error types

pub mod config;
pub mod error;
pub mod invocation;
pub mod launcher;
pub mod runfiles;
pub mod scratch;
pub mod validator;

pub use config::{BridgeMode, OutputMode, WrapperConfig};
pub use error::{ProcessError, ProcessResult};
pub use invocation::{exit_code, ChildInvocation, ChildOutcome};
pub use launcher::{LaunchReport, Launcher, ScratchState};
pub use runfiles::{load_test_args, PathResolver, Runfiles};
pub use scratch::{ScratchDir, SCRATCH_PREFIX};
pub use validator::{ExitCheck, OutputCheck, Verdict, MISSING_OUTPUT_EXIT_CODE};
