//! Unit tests for argument parsing, command execution and summary rendering.

use super::commands::{parse_stage, run_command};
use super::{Cli, CliError, Command, ExecutionSummary, RunCommand, render_summary, run_cli};

use std::path::{Path, PathBuf};

use clap::Parser;
use netguc_core::{PipelineReport, TransformKind, TransformReport, Transformation};
use netguc_test_support::{
    fixtures::{BOWTIE_MTX, MALFORMED_EDGE_MTX, TRIANGLE_MTX, write_fixture},
    tracing::RecordingLayer,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[fixture]
fn workspace() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn run_args(input: &Path, stages: &[&str]) -> RunCommand {
    RunCommand {
        input: input.to_path_buf(),
        stages: stages.iter().map(|&stage| stage.to_owned()).collect(),
        k: None,
        seed: Some(11),
    }
}

fn expect_run(summary: ExecutionSummary) -> (PathBuf, PipelineReport) {
    match summary {
        ExecutionSummary::Run { input, report } => (input, report),
        ExecutionSummary::List => panic!("expected a run summary"),
    }
}

fn rendered(summary: &ExecutionSummary) -> String {
    let mut buffer = Vec::new();
    render_summary(summary, &mut buffer).expect("rendering into memory succeeds");
    String::from_utf8(buffer).expect("summary is UTF-8")
}

#[rstest]
#[case::explicit("edge-swap:5", Some("1"), Transformation::EdgeSwap { iterations: 5 })]
#[case::shared_k("k-core", Some("3"), Transformation::KCore { k: 3 })]
#[case::kind_default("k-shell", None, Transformation::KShell { k: 10 })]
#[case::mixed_case("Random-Walk:2", Some("1"), Transformation::RandomWalk { walk_length: 2 })]
#[case::unused_k("naive-relabel", None, Transformation::NaiveRelabel)]
fn parses_stage_arguments(
    #[case] argument: &str,
    #[case] shared_k: Option<&str>,
    #[case] expected: Transformation,
) -> TestResult {
    assert_eq!(parse_stage(argument, shared_k)?, expected);
    Ok(())
}

#[rstest]
#[case::closeness("closeness:0.25", TransformKind::Closeness, "0.25")]
#[case::betweenness_default("betweenness", TransformKind::Betweenness, "0.5")]
#[case::closeness_default("closeness", TransformKind::Closeness, "0.5")]
fn parses_threshold_stage(
    #[case] argument: &str,
    #[case] kind: TransformKind,
    #[case] raw: &str,
) -> TestResult {
    let stage = parse_stage(argument, None)?;
    assert_eq!(stage.kind(), kind);
    assert_eq!(stage, Transformation::from_raw(kind, raw)?);
    Ok(())
}

#[rstest]
#[case::unknown("shuffle:3", "PARAMETER_UNKNOWN_TRANSFORMATION")]
#[case::not_a_count("edge-swap:lots", "PARAMETER_INVALID_VALUE")]
#[case::fractional_depth("k-shell:1.5", "PARAMETER_INVALID_VALUE")]
#[case::threshold_above_one("betweenness:2", "PARAMETER_THRESHOLD_OUT_OF_RANGE")]
fn rejects_bad_stage_arguments(#[case] argument: &str, #[case] code: &str) {
    let err = parse_stage(argument, None).expect_err("stage must be rejected");
    assert!(matches!(&err, CliError::Stage { argument: given, .. } if given == argument));
    assert_eq!(err.code(), code);
    assert_eq!(err.detail_code(), None);
}

#[test]
fn clap_parses_repeated_stages() -> TestResult {
    let cli = Cli::try_parse_from([
        "netguc",
        "run",
        "graph.mtx",
        "--stage",
        "edge-swap:3",
        "--stage",
        "k-core",
        "--seed",
        "9",
    ])?;
    let Command::Run(run) = cli.command else {
        return Err("expected the run command".into());
    };
    assert_eq!(run.input, PathBuf::from("graph.mtx"));
    assert_eq!(run.stages, vec!["edge-swap:3", "k-core"]);
    assert_eq!(run.k, None);
    assert_eq!(run.seed, Some(9));
    Ok(())
}

#[test]
fn shared_k_applies_to_every_stage_without_its_own() -> TestResult {
    let cli = Cli::try_parse_from([
        "netguc",
        "run",
        "graph.mtx",
        "--stage",
        "betweenness",
        "--stage",
        "closeness:0.1",
        "--k",
        "0.3",
    ])?;
    let Command::Run(run) = cli.command else {
        return Err("expected the run command".into());
    };
    let stages = run
        .stages
        .iter()
        .map(|argument| parse_stage(argument, run.k.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        stages,
        vec![
            Transformation::from_raw(TransformKind::Betweenness, "0.3")?,
            Transformation::from_raw(TransformKind::Closeness, "0.1")?,
        ]
    );
    let err = parse_stage("edge-swap", run.k.as_deref()).expect_err("0.3 is not a count");
    assert_eq!(err.code(), "PARAMETER_INVALID_VALUE");
    Ok(())
}

#[test]
fn clap_requires_a_stage() {
    assert!(Cli::try_parse_from(["netguc", "run", "graph.mtx"]).is_err());
}

#[test]
fn clap_parses_list() -> TestResult {
    let cli = Cli::try_parse_from(["netguc", "list"])?;
    assert!(matches!(cli.command, Command::List));
    Ok(())
}

#[rstest]
fn run_chains_stages_and_renders(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "triangle.mtx", TRIANGLE_MTX)?;
    let summary = run_cli(Cli {
        command: Command::Run(run_args(&input, &["naive-relabel", "k-core:2"])),
    })?;

    let text = rendered(&summary);
    let relabeled = workspace.path().join("triangle_anonymized.mtx");
    assert!(text.contains("stage 0 naive-relabel: relabeled 3 nodes, 3 edges"));
    assert!(text.contains(&format!("  wrote {}", relabeled.display())));
    assert!(text.contains("stage 1 k-core: core k=2 holds 3/3 nodes (max core 2), utility 1.0000"));
    assert!(text.ends_with(&format!("final: {}\n", relabeled.display())));

    let (reported_input, report) = expect_run(summary);
    assert_eq!(reported_input, input);
    assert!(report.completed());
    Ok(())
}

#[rstest]
fn run_reports_infeasible_core(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "triangle.mtx", TRIANGLE_MTX)?;
    let summary = run_command(run_args(&input, &["k-core:5", "naive-relabel"]))?;

    let text = rendered(&summary);
    assert!(text.contains("halted at stage 0 k-core"));
    assert!(text.contains("[CONSTRAINT_EMPTY_CORE]"));
    assert!(text.ends_with(&format!("final: {}\n", input.display())));
    assert!(!workspace.path().join("triangle_anonymized.mtx").exists());

    let (_, report) = expect_run(summary);
    assert!(!report.completed());
    Ok(())
}

#[rstest]
fn run_surfaces_stage_failures(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "bad.mtx", MALFORMED_EDGE_MTX)?;
    let err = run_command(run_args(&input, &["edge-swap:2"])).expect_err("input is malformed");
    assert!(matches!(err, CliError::Pipeline(_)));
    assert_eq!(err.code(), "PIPELINE_STAGE_FAILURE");
    assert_eq!(err.detail_code(), Some("MTX_MALFORMED_EDGE"));
    Ok(())
}

#[rstest]
fn invalid_stage_fails_before_reading(workspace: TempDir) -> TestResult {
    let input = workspace.path().join("never-read.mtx");
    let err = run_command(run_args(&input, &["naive-relabel", "closeness:2"]))
        .expect_err("threshold is out of range");
    assert!(matches!(err, CliError::Stage { .. }));
    Ok(())
}

#[rstest]
fn centrality_stage_runs_without_a_k(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "triangle.mtx", TRIANGLE_MTX)?;
    let summary = run_command(run_args(&input, &["betweenness", "closeness"]))?;

    let text = rendered(&summary);
    assert!(text.contains("stage 0 betweenness: betweenness >= 0.5"));
    assert!(text.contains("stage 1 closeness: closeness >= 0.5"));
    let (_, report) = expect_run(summary);
    assert!(report.completed());
    Ok(())
}

#[rstest]
fn random_walk_summary_counts_moved_edges(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "bowtie.mtx", BOWTIE_MTX)?;
    let summary = run_command(run_args(&input, &["random-walk:3"]))?;

    let (_, report) = expect_run(summary.clone());
    let TransformReport::Rewired(rewiring) = &report.stages()[0].report else {
        return Err("expected a rewiring report".into());
    };
    let moved = rewiring.original_edges - rewiring.self_loops_avoided - rewiring.duplicates_avoided;
    let text = rendered(&summary);
    assert!(text.contains(&format!(
        "stage 0 random-walk: rewired {moved}/{} edges ({} kept to avoid self-loops, {} to avoid duplicates), {} edges after",
        rewiring.original_edges,
        rewiring.self_loops_avoided,
        rewiring.duplicates_avoided,
        rewiring.rewired_edges
    )));
    Ok(())
}

#[test]
fn list_renders_every_kind() {
    let text = rendered(&ExecutionSummary::List);
    let names: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    let expected: Vec<&str> = TransformKind::ALL.iter().map(|kind| kind.name()).collect();
    assert_eq!(names, expected);
    assert!(text.contains("k: iteration count"));
    assert!(text.contains("default: 0.5"));
}

#[rstest]
fn run_records_command_spans(workspace: TempDir) -> TestResult {
    let input = write_fixture(workspace.path(), "triangle.mtx", TRIANGLE_MTX)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        run_cli(Cli {
            command: Command::Run(run_args(&input, &["random-switch:2"])),
        })
    })?;

    let run = layer.span_named("cli.run").ok_or("missing cli.run span")?;
    assert_eq!(run.fields.get("command").map(String::as_str), Some("run"));
    let execute = layer
        .span_named("cli.execute")
        .ok_or("missing cli.execute span")?;
    assert_eq!(execute.fields.get("seed").map(String::as_str), Some("11"));
    assert_eq!(execute.fields.get("stages").map(String::as_str), Some("1"));
    assert_eq!(layer.spans_named("pipeline.stage").len(), 1);
    Ok(())
}
