//! Command implementations and argument parsing for the netguc CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use netguc_core::{
    GraphRenderer, ParameterError, PipelineBuilder, PipelineError, PipelineReport, RenderFrame,
    TransformKind, TransformReport, Transformation, utility::Structure,
};
use thiserror::Error;
use tracing::{Span, debug, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "netguc",
    about = "Anonymise graphs and measure how much structure survives."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run one or more transformations against an edge-list file.
    Run(RunCommand),
    /// List the registered transformations.
    List,
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Matrix-Market edge list to transform.
    pub input: PathBuf,

    /// Stage to run, as `name` or `name:k`; repeat to chain stages.
    #[arg(long = "stage", value_name = "NAME[:K]", required = true)]
    pub stages: Vec<String>,

    /// Parameter for stages that do not give their own `k`. Without it each
    /// stage uses its kind's default (see `list`).
    #[arg(long)]
    pub k: Option<String>,

    /// Seed for reproducible perturbations; entropy when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `--stage` value named an unknown transformation or carried a bad `k`.
    #[error("invalid stage `{argument}`: {source}")]
    Stage {
        /// Stage argument as given.
        argument: String,
        /// Why it was rejected.
        #[source]
        source: ParameterError,
    },
    /// The pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl CliError {
    /// Stable code of the underlying library error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Stage { source, .. } => source.code().as_str(),
            Self::Pipeline(error) => error.code().as_str(),
        }
    }

    /// Code of the error that failed a pipeline stage, if any.
    #[must_use]
    pub fn detail_code(&self) -> Option<&'static str> {
        match self {
            Self::Stage { .. } => None,
            Self::Pipeline(error) => error.stage_code(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// A pipeline ran against `input`.
    Run {
        /// File the first stage read.
        input: PathBuf,
        /// Per-stage results.
        report: PipelineReport,
    },
    /// The registry listing was requested.
    List,
}

/// Logs each frame a stage produces at `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceRenderer;

impl GraphRenderer for TraceRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        debug!(
            title = frame.title(),
            nodes = frame.graph().node_count(),
            edges = frame.graph().edge_count(),
            highlighted = frame.highlight().map(|nodes| nodes.len()),
            scored = frame.scores().is_some(),
            "rendered frame"
        );
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when a stage argument is invalid or the pipeline
/// fails to read or write a file.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use netguc_cli::cli::{Cli, Command, ExecutionSummary, RunCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("triangle.mtx");
/// std::fs::write(
///     &input,
///     "%%MatrixMarket matrix coordinate pattern symmetric\n3 3 3\n1 2\n2 3\n1 3\n",
/// )?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         input: input.clone(),
///         stages: vec!["naive-relabel".into(), "k-core:2".into()],
///         k: None,
///         seed: Some(1),
///     }),
/// };
/// let ExecutionSummary::Run { report, .. } = run_cli(cli)? else {
///     unreachable!("run commands produce run summaries");
/// };
/// assert!(report.completed());
/// assert!(report.final_path().ends_with("triangle_anonymized.mtx"));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
        Command::List => {
            Span::current().record("command", field::display("list"));
            Ok(ExecutionSummary::List)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(input = %command.input.display(), stages = command.stages.len(), seed = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let RunCommand {
        input,
        stages,
        k,
        seed,
    } = command;
    let transformations = stages
        .iter()
        .map(|argument| parse_stage(argument, k.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = PipelineBuilder::new()
        .with_stages(transformations)
        .with_renderer(Box::new(TraceRenderer));
    if let Some(seed) = seed {
        Span::current().record("seed", seed);
        builder = builder.with_seed(seed);
    }
    let report = builder.build()?.run(&input)?;

    info!(
        completed = report.completed(),
        final_path = %report.final_path().display(),
        "command completed"
    );
    Ok(ExecutionSummary::Run { input, report })
}

/// Parses `name` or `name:k`. A stage without its own `k` takes `shared_k`,
/// then the default of its kind.
pub(super) fn parse_stage(
    argument: &str,
    shared_k: Option<&str>,
) -> Result<Transformation, CliError> {
    let (name, attached) = match argument.split_once(':') {
        Some((name, raw)) => (name, Some(raw)),
        None => (argument, None),
    };
    name.parse::<TransformKind>()
        .and_then(|kind| {
            let raw = attached
                .or(shared_k)
                .unwrap_or_else(|| kind.default_parameter());
            Transformation::from_raw(kind, raw)
        })
        .map_err(|source| CliError::Stage {
            argument: argument.to_owned(),
            source,
        })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use netguc_cli::cli::{ExecutionSummary, render_summary};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut buffer = Vec::new();
/// render_summary(&ExecutionSummary::List, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert_eq!(text.lines().count(), 8);
/// assert!(text.starts_with("naive-relabel"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::List => {
            for kind in TransformKind::ALL {
                writeln!(
                    writer,
                    "{:<14} k: {:<20} default: {:<4} {}",
                    kind.name(),
                    kind.parameter(),
                    kind.default_parameter(),
                    kind.description()
                )?;
            }
        }
        ExecutionSummary::Run { input, report } => {
            writeln!(writer, "input: {}", input.display())?;
            for record in report.stages() {
                writeln!(
                    writer,
                    "stage {} {}: {}",
                    record.stage,
                    record.transformation.kind(),
                    describe(&record.report)
                )?;
                if let Some(output) = &record.output {
                    writeln!(writer, "  wrote {}", output.display())?;
                }
            }
            if let Some(halt) = report.halted() {
                writeln!(
                    writer,
                    "halted at stage {} {}: {} [{}]",
                    halt.stage,
                    halt.transformation,
                    halt.reason,
                    halt.reason.code()
                )?;
            }
            writeln!(writer, "final: {}", report.final_path().display())?;
        }
    }
    Ok(())
}

fn describe(report: &TransformReport) -> String {
    match report {
        TransformReport::Relabeled { nodes, edges } => {
            format!("relabeled {nodes} nodes, {edges} edges")
        }
        TransformReport::Perturbed(stats) => format!(
            "applied {}/{} mutations, edges {} -> {}",
            stats.applied(),
            stats.requested(),
            stats.edges_before(),
            stats.edges_after()
        ),
        TransformReport::Rewired(report) => format!(
            "rewired {}/{} edges ({} kept to avoid self-loops, {} to avoid duplicates), \
             {} edges after, {} component(s)",
            report.moved_edges(),
            report.original_edges,
            report.self_loops_avoided,
            report.duplicates_avoided,
            report.rewired_edges,
            report.components
        ),
        TransformReport::Structure(report) => {
            let structure = match report.structure {
                Structure::Core => "core",
                Structure::Shell => "shell",
            };
            format!(
                "{structure} k={} holds {}/{} nodes (max core {}), utility {:.4}",
                report.k,
                report.members.len(),
                report.total_nodes,
                report.max_core,
                report.utility
            )
        }
        TransformReport::Centrality(report) => format!(
            "{} >= {} for {}/{} nodes, average {:.4}, utility {:.4}",
            report.measure,
            report.threshold,
            report.surviving,
            report.scores.len(),
            report.average,
            report.utility
        ),
    }
}
