use std::hash::Hash;

use tracing::{debug, instrument};

use crate::graph::{Graph, NodeId};

/// Replaces every label with its position in node order, starting at zero.
///
/// The result is isomorphic to `graph`: no edge is added or removed and
/// isolated nodes are kept. The node-to-label mapping is discarded.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, perturb::relabel_sequential};
///
/// let graph = Graph::from_edges([(40, 7), (7, 93)]);
/// let relabeled = relabel_sequential(&graph);
/// assert_eq!(relabeled.edge_list(), vec![(0, 1), (1, 2)]);
/// ```
#[instrument(
    name = "perturb.relabel",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn relabel_sequential<N>(graph: &Graph<N>) -> Graph<NodeId>
where
    N: Clone + Eq + Hash,
{
    let label = |node: &N| graph.node_index(node).map_or(0, |index| index as NodeId);

    let mut relabeled = Graph::new();
    for index in 0..graph.node_count() {
        relabeled.add_node(index as NodeId);
    }
    for (source, target) in graph.edges() {
        relabeled.add_edge(label(source), label(target));
    }
    debug!(nodes = relabeled.node_count(), "relabeled nodes");
    relabeled
}
