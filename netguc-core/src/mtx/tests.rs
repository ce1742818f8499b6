//! Unit tests for the Matrix-Market codec.

use std::{collections::HashMap, error::Error, io::Cursor, path::Path};

use netguc_test_support::{
    ci::property_test_profile::ProptestRunProfile, tracing::RecordingLayer,
};
use proptest::{prelude::*, test_runner::Config};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::rstest;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use super::*;
use crate::error::MtxErrorCode;

type TestResult = Result<(), Box<dyn Error>>;

const DEFAULT_CASES: u32 = 64;

const TRIANGLE_AND_ISOLATED: &str = "4 4 4\n1 2\n2 3\n1 3\n4 4\n";

fn suite_config() -> Config {
    let profile = ProptestRunProfile::load(DEFAULT_CASES, false);
    Config {
        cases: profile.cases(),
        fork: profile.fork(),
        ..Config::default()
    }
}

/// Random graph with sparse labels; low densities leave isolated nodes.
fn random_graph(seed: u64) -> Graph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let node_count: NodeId = rng.gen_range(1..=20);
    let stride: NodeId = rng.gen_range(1..=4);
    let probability = rng.gen_range(0.0..=0.5);
    let mut graph = Graph::new();
    for source in 1..=node_count {
        graph.add_node(source * stride);
        for target in (source + 1)..=node_count {
            if rng.gen_bool(probability) {
                graph.add_edge(source * stride, target * stride);
            }
        }
    }
    graph
}

fn sorted_edges(graph: &Graph) -> Vec<(NodeId, NodeId)> {
    let mut edges: Vec<_> = graph
        .edges()
        .map(|(source, target)| ((*source).min(*target), (*source).max(*target)))
        .collect();
    edges.sort_unstable();
    edges
}

/// Reads a one-based file and maps its labels back through the documented
/// mapping.
fn restore_one_based(path: &Path) -> Result<Graph, Box<dyn Error>> {
    let mut inverse = HashMap::new();
    for (original, new) in read_node_mapping(path)? {
        inverse.insert(new, original.parse::<NodeId>()?);
    }
    let written = read_graph(path)?;
    let original = |node: &NodeId| {
        inverse
            .get(node)
            .copied()
            .ok_or_else(|| format!("node {node} has no mapping"))
    };
    let mut restored = Graph::new();
    for node in written.nodes() {
        restored.add_node(original(node)?);
    }
    for (source, target) in written.edges() {
        restored.add_edge(original(source)?, original(target)?);
    }
    Ok(restored)
}

fn parse(text: &str) -> Result<EdgeList, MtxError> {
    parse_edge_list(Cursor::new(text), Path::new("memory.mtx"))
}

#[test]
fn skips_comments_and_blank_lines() -> TestResult {
    let text = "%%MatrixMarket matrix coordinate pattern symmetric\n% note\n\n  % indented\n4 4 2\n\n1 2\n3 4 extra\n";
    let list = parse(text)?;
    assert_eq!(list.header().rows(), 4);
    assert_eq!(list.header().cols(), 4);
    assert_eq!(list.edges(), &[(1, 2), (3, 4)]);
    assert!(!list.count_mismatch());
    Ok(())
}

#[test]
fn header_count_is_not_enforced() -> TestResult {
    let list = parse("3 3 9\n1 2\n")?;
    assert_eq!(list.header().declared_edges(), 9);
    assert!(list.count_mismatch());
    assert_eq!(list.into_graph().edge_count(), 1);
    Ok(())
}

#[rstest]
#[case::only_comments("% nothing here\n", MtxErrorCode::MissingHeader)]
#[case::empty("", MtxErrorCode::MissingHeader)]
#[case::short_header("% c\n3 3\n", MtxErrorCode::MalformedHeader)]
#[case::text_header("rows cols edges\n", MtxErrorCode::MalformedHeader)]
#[case::short_edge("3 3 1\n1\n", MtxErrorCode::MalformedEdge)]
#[case::negative_label("3 3 1\n-1 2\n", MtxErrorCode::MalformedEdge)]
#[case::fractional_label("3 3 1\n1.5 2\n", MtxErrorCode::MalformedEdge)]
fn rejects_malformed_content(#[case] text: &str, #[case] expected: MtxErrorCode) {
    let err = parse(text).expect_err("content must be rejected");
    assert_eq!(err.code(), expected);
    assert!(err.is_format_error());
}

#[test]
fn malformed_edge_reports_physical_line() {
    let err = parse("% banner\n2 2 1\n\n1 x\n").expect_err("edge must be rejected");
    match err {
        MtxError::MalformedEdge { line, content, .. } => {
            assert_eq!(line, 4);
            assert_eq!(content, "1 x");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().expect("create temp dir");
    let err = read_graph(&dir.path().join("absent.mtx")).expect_err("file is absent");
    assert_eq!(err.code(), MtxErrorCode::Io);
    assert!(!err.is_format_error());
}

#[test]
fn passthrough_uses_largest_label_for_dimensions() -> TestResult {
    let graph: Graph = Graph::from_edges([(2, 7), (7, 3)]);
    let text = encode_graph(&graph, Some("sample"), Addressing::Passthrough)?;
    let expected = format!("{MATRIX_MARKET_BANNER}\n% sample\n7 7 2\n2 7\n7 3\n");
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn one_based_documents_mapping() -> TestResult {
    let graph: Graph = Graph::from_edges([(10, 20), (20, 30)]);
    let text = encode_graph(&graph, None, Addressing::OneBased)?;
    let expected = format!(
        "{MATRIX_MARKET_BANNER}\n% node_mapping: original_label->new_label (1-based)\n\
         % 10 -> 1\n% 20 -> 2\n% 30 -> 3\n3 3 2\n1 2\n2 3\n"
    );
    assert_eq!(text, expected);
    Ok(())
}

#[test]
fn multi_line_comments_are_prefixed() -> TestResult {
    let graph: Graph = Graph::from_edges([(1, 2)]);
    let text = encode_graph(&graph, Some("first\nsecond"), Addressing::Passthrough)?;
    assert!(text.contains("% first\n% second\n"));
    Ok(())
}

#[test]
fn non_integer_labels_need_remapping() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("named.mtx");
    let graph = Graph::from_edges([("alice".to_owned(), "bob".to_owned())]);

    let err = write_graph(&graph, &path, None, Addressing::Passthrough)
        .expect_err("labels are not integers");
    assert_eq!(err.code(), MtxErrorCode::NonIntegerLabel);
    assert!(!path.exists(), "nothing may be written on failure");

    write_graph(&graph, &path, None, Addressing::OneBased)?;
    let mapping = read_node_mapping(&path)?;
    assert_eq!(mapping.get("alice"), Some(&1));
    assert_eq!(mapping.get("bob"), Some(&2));
    Ok(())
}

#[test]
fn write_then_read_preserves_edges() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("out.mtx");
    let graph: Graph = Graph::from_edges([(1, 2), (2, 3), (3, 4), (4, 1)]);

    let written = write_graph(&graph, &path, Some("round trip"), Addressing::Passthrough)?;
    assert_eq!(written, path);

    let list = read_edge_list(&path)?;
    assert_eq!(list.header().declared_edges(), 4);
    assert_eq!(list.into_graph(), graph);
    Ok(())
}

#[test]
fn mapping_parser_ignores_unrelated_comments() -> TestResult {
    let text = "%%MatrixMarket matrix coordinate pattern symmetric\n% anonymized\n\
                % node_mapping: original_label->new_label (1-based)\n% 5 -> 1\n% 9 -> 2\n2 2 1\n1 2\n";
    let mapping = parse_node_mapping(Cursor::new(text), Path::new("memory.mtx"))?;
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.get("5"), Some(&1));
    assert_eq!(mapping.get("9"), Some(&2));
    Ok(())
}

#[rstest]
#[case::passthrough(Addressing::Passthrough)]
#[case::one_based(Addressing::OneBased)]
fn isolated_nodes_survive_write_and_read(#[case] addressing: Addressing) -> TestResult {
    let graph = parse(TRIANGLE_AND_ISOLATED)?.into_graph();
    assert_eq!(graph.degree_sequence(), vec![0, 2, 2, 2]);

    let dir = TempDir::new()?;
    let path = write_graph(&graph, &dir.path().join("iso.mtx"), None, addressing)?;
    let list = read_edge_list(&path)?;
    assert_eq!(list.header().declared_edges(), 4);
    assert!(!list.count_mismatch());

    let reread = list.into_graph();
    assert_eq!(reread.node_count(), 4);
    assert_eq!(reread.edge_count(), 3);
    assert_eq!(reread.degree_sequence(), vec![0, 2, 2, 2]);
    Ok(())
}

#[test]
fn isolated_nodes_are_written_after_edges() -> TestResult {
    let mut graph: Graph = Graph::from_edges([(2, 5)]);
    graph.add_node(9);
    graph.add_node(1);

    let passthrough = encode_graph(&graph, None, Addressing::Passthrough)?;
    assert_eq!(passthrough, format!("{MATRIX_MARKET_BANNER}\n9 9 3\n2 5\n9 9\n1 1\n"));

    let one_based = encode_graph(&graph, None, Addressing::OneBased)?;
    assert!(one_based.ends_with("% 1 -> 4\n4 4 3\n1 2\n3 3\n4 4\n"));
    Ok(())
}

#[test]
fn isolated_node_lines_do_not_count_as_dropped_self_loops() -> TestResult {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let list = parse("5 5 3\n1 2\n2 2\n5 5\n")?;
    let graph = tracing::subscriber::with_default(subscriber, || list.into_graph());

    let warnings = layer.events_at(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].fields.get("self_loops").map(String::as_str), Some("1"));
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.degree(&5), Some(0));
    assert_eq!(graph.degree(&2), Some(1));
    Ok(())
}

proptest! {
    #![proptest_config(suite_config())]

    #[test]
    fn passthrough_round_trip_keeps_edges_and_degrees(seed in any::<u64>()) {
        let graph = random_graph(seed);
        let dir = TempDir::new().expect("create temp dir");
        let path = write_graph(&graph, &dir.path().join("copy.mtx"), None, Addressing::Passthrough)
            .expect("integer labels are writable");

        let reread = read_graph(&path).expect("written file parses");
        prop_assert_eq!(sorted_edges(&reread), sorted_edges(&graph));
        prop_assert_eq!(reread.degree_sequence(), graph.degree_sequence());
        prop_assert_eq!(reread, graph);
    }

    #[test]
    fn one_based_round_trip_restores_the_graph(seed in any::<u64>()) {
        let graph = random_graph(seed);
        let dir = TempDir::new().expect("create temp dir");
        let path = write_graph(&graph, &dir.path().join("remapped.mtx"), None, Addressing::OneBased)
            .expect("one-based writing accepts any label");

        let mapping = read_node_mapping(&path).expect("mapping parses");
        let mut targets: Vec<NodeId> = mapping.values().copied().collect();
        targets.sort_unstable();
        let expected: Vec<NodeId> = (1..=graph.node_count() as NodeId).collect();
        prop_assert_eq!(targets, expected);

        let restored = restore_one_based(&path).expect("every written node is mapped");
        prop_assert_eq!(restored, graph);
    }
}
