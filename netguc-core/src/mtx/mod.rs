//! Matrix-Market coordinate codec for undirected edge lists.
//!
//! Reading accepts any file whose first non-comment line holds
//! `rows cols edges` followed by one `u v` pair per line. Writing always emits
//! the symmetric pattern banner, optional comment lines, an `n n m` header
//! and one line per undirected edge. Isolated nodes follow as `v v` lines,
//! counted in `m`, which the reader turns back into nodes without edges.

use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use tracing::{Span, debug, field, info, instrument, warn};

use crate::{
    error::MtxError,
    graph::{Graph, NodeId, NodeLabel},
};

/// Banner written as the first line of every output file.
pub const MATRIX_MARKET_BANNER: &str = "%%MatrixMarket matrix coordinate pattern symmetric";

const MAPPING_PREAMBLE: &str = "node_mapping: original_label->new_label (1-based)";
const MAPPING_ARROW: &str = " -> ";

/// How node labels are translated when writing a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Addressing {
    /// Write integer labels verbatim; `n` is the largest label.
    #[default]
    Passthrough,
    /// Remap labels to `1..=n` in node order and document the mapping in
    /// comment lines.
    OneBased,
}

/// The `rows cols edges` line of an edge-list file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MtxHeader {
    rows: u64,
    cols: u64,
    declared_edges: u64,
}

impl MtxHeader {
    /// Returns the declared row count.
    #[must_use]
    #[rustfmt::skip]
    pub fn rows(&self) -> u64 { self.rows }

    /// Returns the declared column count.
    #[must_use]
    #[rustfmt::skip]
    pub fn cols(&self) -> u64 { self.cols }

    /// Returns the edge count declared by the header. It is never checked
    /// against the body.
    #[must_use]
    #[rustfmt::skip]
    pub fn declared_edges(&self) -> u64 { self.declared_edges }
}

/// Parsed contents of an edge-list file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeList {
    header: MtxHeader,
    edges: Vec<(NodeId, NodeId)>,
}

impl EdgeList {
    /// Returns the parsed header.
    #[must_use]
    #[rustfmt::skip]
    pub fn header(&self) -> MtxHeader { self.header }

    /// Returns the edges in file order, duplicates included.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[(NodeId, NodeId)] { &self.edges }

    /// Returns `true` when the body line count differs from the header.
    #[must_use]
    pub fn count_mismatch(&self) -> bool {
        u64::try_from(self.edges.len()).map_or(true, |count| count != self.header.declared_edges)
    }

    /// Builds the graph described by the edge list.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        Graph::from_edges(self.edges)
    }
}

/// Parses an edge list from `reader`; `origin` names the source in errors.
///
/// # Errors
/// Returns [`MtxError::MissingHeader`], [`MtxError::MalformedHeader`] or
/// [`MtxError::MalformedEdge`] for malformed content and [`MtxError::Io`] when
/// reading fails.
///
/// # Examples
/// ```
/// use std::{io::Cursor, path::Path};
/// use netguc_core::mtx::parse_edge_list;
///
/// let text = "%%MatrixMarket matrix coordinate pattern symmetric\n3 3 3\n1 2\n2 3\n1 3\n";
/// let list = parse_edge_list(Cursor::new(text), Path::new("triangle.mtx"))?;
/// assert_eq!(list.header().declared_edges(), 3);
/// assert_eq!(list.edges(), &[(1, 2), (2, 3), (1, 3)]);
/// # Ok::<(), netguc_core::MtxError>(())
/// ```
pub fn parse_edge_list<R: BufRead>(reader: R, origin: &Path) -> Result<EdgeList, MtxError> {
    let mut header = None;
    let mut edges = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| MtxError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let line_number = index + 1;
        if header.is_none() {
            header = Some(parse_header(trimmed, origin, line_number)?);
            continue;
        }
        edges.push(parse_edge(trimmed, origin, line_number)?);
    }

    let header = header.ok_or_else(|| MtxError::MissingHeader {
        path: origin.to_path_buf(),
    })?;
    Ok(EdgeList { header, edges })
}

fn parse_header(line: &str, origin: &Path, line_number: usize) -> Result<MtxHeader, MtxError> {
    let malformed = || MtxError::MalformedHeader {
        path: origin.to_path_buf(),
        line: line_number,
        content: line.to_owned(),
    };
    let mut fields = line.split_whitespace().map(str::parse::<u64>);
    let mut next = || fields.next().and_then(Result::ok).ok_or_else(malformed);
    Ok(MtxHeader {
        rows: next()?,
        cols: next()?,
        declared_edges: next()?,
    })
}

fn parse_edge(
    line: &str,
    origin: &Path,
    line_number: usize,
) -> Result<(NodeId, NodeId), MtxError> {
    let malformed = || MtxError::MalformedEdge {
        path: origin.to_path_buf(),
        line: line_number,
        content: line.to_owned(),
    };
    let mut fields = line.split_whitespace().map(str::parse::<NodeId>);
    let mut next = || fields.next().and_then(Result::ok).ok_or_else(malformed);
    Ok((next()?, next()?))
}

/// Reads an edge list from `path`.
///
/// # Errors
/// Returns [`MtxError::Io`] when the file cannot be opened, and the format
/// errors described on [`parse_edge_list`].
#[instrument(name = "mtx.read", err, fields(path = %path.display(), edges = field::Empty))]
pub fn read_edge_list(path: &Path) -> Result<EdgeList, MtxError> {
    let file = File::open(path).map_err(|source| MtxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_edge_list(BufReader::new(file), path)?;
    Span::current().record("edges", list.edges.len());
    if list.count_mismatch() {
        warn!(
            declared = list.header.declared_edges,
            found = list.edges.len(),
            "header edge count does not match body"
        );
    }
    Ok(list)
}

/// Reads `path` and builds its graph.
///
/// # Errors
/// See [`read_edge_list`].
pub fn read_graph(path: &Path) -> Result<Graph, MtxError> {
    let list = read_edge_list(path)?;
    info!(edges = list.edges.len(), "loaded edges");
    let graph = list.into_graph();
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built graph"
    );
    Ok(graph)
}

/// Serialises `graph` to the text written by [`write_graph`].
///
/// Nothing is produced unless every label can be encoded.
///
/// # Errors
/// Returns [`MtxError::NonIntegerLabel`] when `addressing` is
/// [`Addressing::Passthrough`] and a node label is not an integer.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, mtx::{Addressing, encode_graph}};
///
/// let graph: Graph = Graph::from_edges([(10, 20)]);
/// let text = encode_graph(&graph, None, Addressing::OneBased)?;
/// assert!(text.contains("% 10 -> 1\n% 20 -> 2\n2 2 1\n1 2\n"));
/// # Ok::<(), netguc_core::MtxError>(())
/// ```
pub fn encode_graph<N: NodeLabel>(
    graph: &Graph<N>,
    comment: Option<&str>,
    addressing: Addressing,
) -> Result<String, MtxError> {
    let mut text = String::new();
    text.push_str(MATRIX_MARKET_BANNER);
    text.push('\n');
    if let Some(comment) = comment.filter(|value| !value.is_empty()) {
        for line in comment.lines() {
            let _ = writeln!(text, "% {line}");
        }
    }

    match addressing {
        Addressing::OneBased => encode_one_based(graph, &mut text),
        Addressing::Passthrough => encode_passthrough(graph, &mut text)?,
    }
    Ok(text)
}

fn encode_one_based<N: NodeLabel>(graph: &Graph<N>, text: &mut String) {
    let _ = writeln!(text, "% {MAPPING_PREAMBLE}");
    for (index, node) in graph.nodes().enumerate() {
        let _ = writeln!(text, "% {node}{MAPPING_ARROW}{}", index + 1);
    }
    // Every endpoint comes from the graph's own node table.
    let position = |node: &N| graph.node_index(node).map_or(0, |index| index + 1);
    let isolated = isolated_nodes(graph);
    let n = graph.node_count();
    let _ = writeln!(text, "{n} {n} {}", graph.edge_count() + isolated.len());
    for (source, target) in graph.edges() {
        let _ = writeln!(text, "{} {}", position(source), position(target));
    }
    for node in isolated {
        let index = position(node);
        let _ = writeln!(text, "{index} {index}");
    }
}

fn encode_passthrough<N: NodeLabel>(graph: &Graph<N>, text: &mut String) -> Result<(), MtxError> {
    let integer = |node: &N| {
        node.as_integer().ok_or_else(|| MtxError::NonIntegerLabel {
            label: node.to_string(),
        })
    };
    let mut n = 0_u64;
    for node in graph.nodes() {
        n = n.max(integer(node)?);
    }
    let isolated = isolated_nodes(graph);
    let _ = writeln!(text, "{n} {n} {}", graph.edge_count() + isolated.len());
    for (source, target) in graph.edges() {
        let _ = writeln!(text, "{} {}", integer(source)?, integer(target)?);
    }
    for node in isolated {
        let label = integer(node)?;
        let _ = writeln!(text, "{label} {label}");
    }
    Ok(())
}

/// Nodes without edges, written as `v v` lines so reading restores them.
fn isolated_nodes<N: NodeLabel>(graph: &Graph<N>) -> Vec<&N> {
    graph
        .nodes()
        .filter(|node| graph.degree(node) == Some(0))
        .collect()
}

/// Writes `graph` to `path`, creating parent directories as needed.
///
/// Returns the written path so transformations can chain on it.
///
/// # Errors
/// Returns [`MtxError::NonIntegerLabel`] as described on [`encode_graph`] and
/// [`MtxError::Io`] when the destination cannot be written.
#[instrument(
    name = "mtx.write",
    err,
    skip(graph, comment),
    fields(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn write_graph<N: NodeLabel>(
    graph: &Graph<N>,
    path: &Path,
    comment: Option<&str>,
    addressing: Addressing,
) -> Result<PathBuf, MtxError> {
    let text = encode_graph(graph, comment, addressing)?;
    let io_error = |source| MtxError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, text).map_err(io_error)?;
    debug!("wrote graph");
    Ok(path.to_path_buf())
}

/// Parses the `% original -> new` lines written with
/// [`Addressing::OneBased`], keyed by original label.
///
/// Comment lines that do not describe a mapping are ignored.
///
/// # Errors
/// Returns [`MtxError::Io`] when reading fails.
pub fn parse_node_mapping<R: BufRead>(
    reader: R,
    origin: &Path,
) -> Result<IndexMap<String, NodeId>, MtxError> {
    let mut mapping = IndexMap::new();
    for line in reader.lines() {
        let line = line.map_err(|source| MtxError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        let Some(body) = line.trim().strip_prefix('%') else {
            continue;
        };
        let Some((original, new)) = body.trim().split_once(MAPPING_ARROW.trim()) else {
            continue;
        };
        let (original, new) = (original.trim(), new.trim());
        if original.is_empty() || original.starts_with('%') {
            continue;
        }
        if let Ok(new) = new.parse::<NodeId>() {
            mapping.insert(original.to_owned(), new);
        }
    }
    Ok(mapping)
}

/// Reads the node mapping documented in the comments of `path`.
///
/// # Errors
/// Returns [`MtxError::Io`] when the file cannot be read.
pub fn read_node_mapping(path: &Path) -> Result<IndexMap<String, NodeId>, MtxError> {
    let file = File::open(path).map_err(|source| MtxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_node_mapping(BufReader::new(file), path)
}

#[cfg(test)]
mod tests;
