//! Blendwrap CLI library.
//!
//! The `blendwrap` binary plays one of two roles, fixed at start-up by the
//! bridge sentinel in its environment:
//!
//! - **Launcher** ([`commands::launch`]): a build action. Validates its
//!   arguments, spawns Blender and decides whether the run succeeded.
//! - **Callback** ([`commands::callback`]): re-entered from the script Blender
//!   runs. Reads the bridge and drives one export per declared output.

pub mod cli_args;
pub mod commands;
pub mod logging;
pub mod role;
