//! Support library for the netguc CLI binary.
//!
//! Exposes the command and logging modules so doctests and tests can drive
//! the pipeline without forking a subprocess.

pub mod cli;
pub mod logging;
