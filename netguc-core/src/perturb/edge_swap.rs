use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, instrument};

use super::PerturbationStats;
use crate::graph::{Graph, NodeId};

/// Degree-preserving double-edge swap.
///
/// Runs up to `iterations` attempts. Each attempt draws two edges `(a, b)`
/// and `(c, d)` with replacement from the current working copy and, when the
/// four endpoints are distinct and neither `(a, d)` nor `(b, c)` exists,
/// replaces them with `(a, d)` and `(b, c)`. Rejected attempts still consume
/// budget.
///
/// Every node keeps its exact degree and the edge count never changes.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, perturb::double_edge_swap};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let graph = Graph::from_edges([(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
/// let mut rng = SmallRng::seed_from_u64(7);
/// let (swapped, stats) = double_edge_swap(&graph, 20, &mut rng);
/// assert_eq!(swapped.degree_sequence(), graph.degree_sequence());
/// assert_eq!(stats.edges_after(), stats.edges_before());
/// ```
#[instrument(
    name = "perturb.edge_swap",
    skip(graph, rng),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn double_edge_swap<R>(
    graph: &Graph,
    iterations: usize,
    rng: &mut R,
) -> (Graph, PerturbationStats)
where
    R: Rng + ?Sized,
{
    let mut working = graph.clone();
    let mut stats = PerturbationStats::new(iterations, graph.edge_count());
    let mut edges = working.edge_list();

    for _ in 0..iterations {
        let (Some(&first), Some(&second)) = (edges.choose(rng), edges.choose(rng)) else {
            break;
        };
        if !try_swap(&mut working, first, second) {
            continue;
        }
        stats.record_applied();
        edges = working.edge_list();
    }

    let stats = stats.finish(working.edge_count());
    info!(
        requested = stats.requested(),
        applied = stats.applied(),
        "double-edge swap complete"
    );
    (working, stats)
}

fn try_swap(graph: &mut Graph, (a, b): (NodeId, NodeId), (c, d): (NodeId, NodeId)) -> bool {
    if a == c && b == d {
        return false;
    }
    if a == c || a == d || b == c || b == d {
        return false;
    }
    if graph.has_edge(&a, &d) || graph.has_edge(&b, &c) {
        return false;
    }

    graph.remove_edge(&a, &b);
    graph.remove_edge(&c, &d);
    graph.add_edge(a, d);
    graph.add_edge(b, c);
    debug!(removed = ?[(a, b), (c, d)], added = ?[(a, d), (b, c)], "swapped edges");
    true
}
