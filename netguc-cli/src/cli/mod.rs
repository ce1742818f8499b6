//! Command-line interface orchestration for netguc.
//!
//! `run` chains registered transformations over one edge-list file and
//! `list` prints the registry.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, TraceRenderer, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
