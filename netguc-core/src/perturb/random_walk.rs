use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, instrument, warn};

use crate::graph::{Graph, NodeId};

/// Outcome of [`random_walk_rewire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewiringReport {
    /// Edge count of the input graph.
    pub original_edges: usize,
    /// Edge count of the rewired graph.
    pub rewired_edges: usize,
    /// Edges kept because no loop-free endpoint existed.
    pub self_loops_avoided: usize,
    /// Edges kept because every candidate endpoint was already connected.
    pub duplicates_avoided: usize,
    /// Whether the rewired graph is connected. Informational only.
    pub connected: bool,
    /// Connected components of the rewired graph.
    pub components: usize,
}

impl RewiringReport {
    /// Edges given a new endpoint, excluding those kept to avoid a self-loop
    /// or a duplicate.
    #[must_use]
    pub fn moved_edges(&self) -> usize {
        self.original_edges
            .saturating_sub(self.self_loops_avoided + self.duplicates_avoided)
    }
}

/// Rewires each edge `(u, v)` to `(u, w)` where `w` ends a `walk_length`-step
/// random walk from `v`.
///
/// Walks always run over the unmodified input graph so earlier rewirings do
/// not bias later ones. When `w` would close a self-loop the walk falls back
/// to another neighbour of `u`; when `(u, w)` already exists one extra step
/// is tried. If neither recovers, the original edge is kept. The edge count
/// is preserved exactly.
#[instrument(
    name = "perturb.random_walk",
    skip(graph, rng),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub fn random_walk_rewire<R>(
    graph: &Graph,
    walk_length: usize,
    rng: &mut R,
) -> (Graph, RewiringReport)
where
    R: Rng + ?Sized,
{
    let mut working = graph.clone();
    let mut self_loops_avoided = 0;
    let mut duplicates_avoided = 0;

    for (&source, &target) in graph.edges() {
        let endpoint = walk(graph, target, walk_length, rng);
        working.remove_edge(&source, &target);

        match reconcile(graph, &working, source, target, endpoint, rng) {
            Ok(replacement) => {
                working.add_edge(source, replacement);
            }
            Err(Avoided::SelfLoop) => {
                working.add_edge(source, target);
                self_loops_avoided += 1;
            }
            Err(Avoided::Duplicate) => {
                working.add_edge(source, target);
                duplicates_avoided += 1;
            }
        }
    }

    let components = working.connected_components();
    let report = RewiringReport {
        original_edges: graph.edge_count(),
        rewired_edges: working.edge_count(),
        self_loops_avoided,
        duplicates_avoided,
        connected: components == 1,
        components,
    };
    info!(
        original_edges = report.original_edges,
        rewired_edges = report.rewired_edges,
        self_loops_avoided,
        duplicates_avoided,
        "random-walk rewiring complete"
    );
    if report.connected {
        info!("graph remains connected");
    } else {
        warn!(components, "rewired graph is disconnected");
    }
    (working, report)
}

enum Avoided {
    SelfLoop,
    Duplicate,
}

fn reconcile<R>(
    original: &Graph,
    working: &Graph,
    source: NodeId,
    target: NodeId,
    mut endpoint: NodeId,
    rng: &mut R,
) -> Result<NodeId, Avoided>
where
    R: Rng + ?Sized,
{
    if endpoint == source {
        let neighbours: Vec<NodeId> = original
            .neighbors(&source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        let alternatives: Vec<NodeId> = neighbours
            .iter()
            .copied()
            .filter(|node| *node != target)
            .collect();
        endpoint = if let Some(&choice) = alternatives.choose(rng) {
            choice
        } else if neighbours.is_empty() {
            return Err(Avoided::SelfLoop);
        } else {
            target
        };
    }

    if working.has_edge(&source, &endpoint) {
        let Some(next) = step(original, endpoint, rng) else {
            return Err(Avoided::Duplicate);
        };
        if next == source || working.has_edge(&source, &next) {
            return Err(Avoided::Duplicate);
        }
        debug!(source, endpoint, next, "extended walk to avoid duplicate edge");
        endpoint = next;
    }
    Ok(endpoint)
}

/// Walks up to `steps` uniform steps from `start`, halting at a node
/// without neighbours.
fn walk<R>(graph: &Graph, start: NodeId, steps: usize, rng: &mut R) -> NodeId
where
    R: Rng + ?Sized,
{
    let mut current = start;
    for _ in 0..steps {
        let Some(next) = step(graph, current, rng) else {
            break;
        };
        current = next;
    }
    current
}

fn step<R>(graph: &Graph, node: NodeId, rng: &mut R) -> Option<NodeId>
where
    R: Rng + ?Sized,
{
    let neighbours = graph.neighbors(&node)?;
    if neighbours.is_empty() {
        return None;
    }
    neighbours.get_index(rng.gen_range(0..neighbours.len())).copied()
}
