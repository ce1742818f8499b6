use indexmap::{IndexMap, IndexSet};
use tracing::{info, instrument};

use super::ratio;
use crate::{
    error::ConstraintError,
    graph::{Graph, NodeId},
};

/// Which core-decomposition structure a [`StructureReport`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    /// Nodes whose core number is at least `k`.
    Core,
    /// Nodes whose core number is exactly `k`.
    Shell,
}

/// Members and utility of a k-core or k-shell.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureReport {
    /// Structure the members belong to.
    pub structure: Structure,
    /// Requested depth.
    pub k: usize,
    /// Member nodes in graph order.
    pub members: IndexSet<NodeId>,
    /// Node count of the whole graph.
    pub total_nodes: usize,
    /// Largest degree in the whole graph.
    pub max_degree: usize,
    /// Largest core number in the whole graph.
    pub max_core: usize,
    /// `members / total_nodes`.
    pub utility: f64,
}

/// Core number of every node, in graph order.
///
/// A node's core number is the largest `k` such that it belongs to the
/// k-core. Computed by repeatedly peeling a node of minimum remaining degree.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, utility::core_numbers};
///
/// let mut graph = Graph::from_edges([(1, 2), (2, 3), (1, 3), (3, 4)]);
/// graph.add_node(5);
/// let cores = core_numbers(&graph);
/// assert_eq!(cores.values().copied().collect::<Vec<_>>(), vec![2, 2, 2, 1, 0]);
/// ```
#[must_use]
pub fn core_numbers(graph: &Graph) -> IndexMap<NodeId, usize> {
    let adjacency = graph.index_adjacency();
    let mut degrees: Vec<usize> = adjacency.iter().map(Vec::len).collect();
    let mut cores = vec![0; adjacency.len()];
    let mut removed = vec![false; adjacency.len()];
    let mut level = 0;

    for _ in 0..adjacency.len() {
        let Some(next) = (0..adjacency.len())
            .filter(|index| !removed[*index])
            .min_by_key(|index| degrees[*index])
        else {
            break;
        };
        level = level.max(degrees[next]);
        cores[next] = level;
        removed[next] = true;
        for &neighbour in &adjacency[next] {
            if !removed[neighbour] {
                degrees[neighbour] -= 1;
            }
        }
    }

    graph.nodes().copied().zip(cores).collect()
}

/// Nodes of the k-core: the maximal subgraph whose nodes all have degree at
/// least `k` within it.
///
/// # Errors
/// Returns [`ConstraintError::EmptyGraph`] for a graph without nodes and
/// [`ConstraintError::EmptyCore`] when no node survives peeling.
#[instrument(name = "utility.k_core", err, skip(graph), fields(nodes = graph.node_count()))]
pub fn k_core(graph: &Graph, k: usize) -> Result<StructureReport, ConstraintError> {
    decompose(graph, k, Structure::Core)
}

/// Nodes of the k-shell: members of the k-core that are absent from the
/// (k+1)-core.
///
/// # Errors
/// Returns [`ConstraintError::EmptyGraph`] for a graph without nodes and
/// [`ConstraintError::EmptyShell`] when no node has core number `k`.
#[instrument(name = "utility.k_shell", err, skip(graph), fields(nodes = graph.node_count()))]
pub fn k_shell(graph: &Graph, k: usize) -> Result<StructureReport, ConstraintError> {
    decompose(graph, k, Structure::Shell)
}

fn decompose(
    graph: &Graph,
    k: usize,
    structure: Structure,
) -> Result<StructureReport, ConstraintError> {
    if graph.is_empty() {
        return Err(ConstraintError::EmptyGraph);
    }
    let max_degree = graph.max_degree();
    info!(
        max_degree,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph"
    );

    let cores = core_numbers(graph);
    let max_core = cores.values().copied().max().unwrap_or(0);
    let members: IndexSet<NodeId> = cores
        .iter()
        .filter(|(_, core)| match structure {
            Structure::Core => **core >= k,
            Structure::Shell => **core == k,
        })
        .map(|(node, _)| *node)
        .collect();

    if members.is_empty() {
        return Err(match structure {
            Structure::Core => ConstraintError::EmptyCore { k, max_core },
            Structure::Shell => ConstraintError::EmptyShell { k, max_core },
        });
    }

    let utility = ratio(members.len(), graph.node_count());
    info!(
        ?structure,
        k,
        size = members.len(),
        utility,
        "structure utility"
    );
    Ok(StructureReport {
        structure,
        k,
        members,
        total_nodes: graph.node_count(),
        max_degree,
        max_core,
        utility,
    })
}
