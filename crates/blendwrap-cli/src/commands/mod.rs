//! Role implementations.
//!
//! Each role returns an exit code; `main` decides which one runs.

pub mod callback;
pub mod launch;
