use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, instrument};

use super::PerturbationStats;
use crate::graph::{Graph, NodeId};

/// Adds a random absent edge and removes a random existing one, `iterations`
/// times.
///
/// Each iteration snapshots the edge set, adds one pair drawn uniformly from
/// the complement, then removes one edge drawn from the snapshot taken before
/// the addition, so the new edge is never the one removed. The loop stops
/// early once the graph is complete or edgeless. The edge count is preserved;
/// the degree sequence generally is not.
#[instrument(
    name = "perturb.random_switch",
    skip(graph, rng),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn random_switch<R>(graph: &Graph, iterations: usize, rng: &mut R) -> (Graph, PerturbationStats)
where
    R: Rng + ?Sized,
{
    let mut working = graph.clone();
    let mut stats = PerturbationStats::new(iterations, graph.edge_count());
    let nodes: Vec<NodeId> = working.nodes().copied().collect();

    for _ in 0..iterations {
        let snapshot = working.edge_list();
        if snapshot.is_empty() {
            debug!("no edges left to remove");
            break;
        }
        let absent = absent_pairs(&working, &nodes);
        let Some(&(source, target)) = absent.choose(rng) else {
            debug!("graph is complete");
            break;
        };
        working.add_edge(source, target);

        if let Some((old_source, old_target)) = snapshot.choose(rng) {
            working.remove_edge(old_source, old_target);
        }
        stats.record_applied();
    }

    let stats = stats.finish(working.edge_count());
    info!(
        requested = stats.requested(),
        applied = stats.applied(),
        "random switch complete"
    );
    (working, stats)
}

/// Unordered node pairs that are not yet connected, in node order.
fn absent_pairs(graph: &Graph, nodes: &[NodeId]) -> Vec<(NodeId, NodeId)> {
    nodes
        .iter()
        .enumerate()
        .flat_map(|(index, source)| {
            nodes[index + 1..]
                .iter()
                .filter(move |target| !graph.has_edge(source, target))
                .map(move |target| (*source, *target))
        })
        .collect()
}
