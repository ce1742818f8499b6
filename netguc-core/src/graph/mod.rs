//! Undirected simple graph with insertion-ordered storage.
//!
//! Nodes and each node's neighbours are kept in insertion order so every
//! iteration (nodes, edges, neighbours) is reproducible for a given input
//! file. Relabeling, one-based remapping, and seeded randomised perturbations
//! all depend on that order.

mod union_find;

use std::{fmt, hash::Hash};

use indexmap::{IndexMap, IndexSet};
use tracing::warn;

use self::union_find::UnionFind;

/// Label type of graphs loaded from edge-list files.
pub type NodeId = u64;

/// Node labels that may be written to a Matrix-Market file.
///
/// Labels are written verbatim only when [`NodeLabel::as_integer`] yields a
/// value; otherwise the writer must remap them.
pub trait NodeLabel: Clone + Eq + Hash + fmt::Display {
    /// Returns the label as a non-negative integer when it has one.
    fn as_integer(&self) -> Option<u64>;
}

impl NodeLabel for u64 {
    fn as_integer(&self) -> Option<u64> {
        Some(*self)
    }
}

impl NodeLabel for u32 {
    fn as_integer(&self) -> Option<u64> {
        Some(u64::from(*self))
    }
}

impl NodeLabel for usize {
    fn as_integer(&self) -> Option<u64> {
        u64::try_from(*self).ok()
    }
}

impl NodeLabel for String {
    fn as_integer(&self) -> Option<u64> {
        self.trim().parse().ok()
    }
}

/// Simple undirected graph: no self-loops and no parallel edges.
///
/// # Examples
/// ```
/// use netguc_core::Graph;
///
/// let graph = Graph::from_edges([(1, 2), (2, 3), (3, 1), (2, 1)]);
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert_eq!(graph.degree_sequence(), vec![2, 2, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph<N: Hash + Eq = NodeId> {
    adjacency: IndexMap<N, IndexSet<N>>,
    edge_count: usize,
}

impl<N: Hash + Eq> Default for Graph<N> {
    fn default() -> Self {
        Self {
            adjacency: IndexMap::new(),
            edge_count: 0,
        }
    }
}

impl<N: Clone + Eq + Hash> Graph<N> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from an edge sequence.
    ///
    /// Repeated edges collapse into one regardless of orientation. Self-loops
    /// register their node but no edge, so `(v, v)` declares an isolated node.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        let mut looped = Vec::new();
        for (source, target) in edges {
            if source == target {
                looped.push(source.clone());
            }
            graph.add_edge(source, target);
        }
        // A self-loop on a node without other edges marks an isolated node.
        let self_loops = looped
            .iter()
            .filter(|node| graph.degree(node).is_some_and(|degree| degree > 0))
            .count();
        if self_loops > 0 {
            warn!(self_loops, "dropped self-loop edges while building graph");
        }
        graph
    }

    /// Inserts `node` if absent, returning `true` when it was new.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, IndexSet::new());
        true
    }

    /// Inserts the undirected edge `{source, target}`, adding missing
    /// endpoints. Returns `true` when the edge was new.
    ///
    /// A self-loop registers its node and returns `false`.
    pub fn add_edge(&mut self, source: N, target: N) -> bool {
        if source == target {
            self.add_node(source);
            return false;
        }
        let inserted = self
            .adjacency
            .entry(source.clone())
            .or_default()
            .insert(target.clone());
        self.adjacency.entry(target).or_default().insert(source);
        if inserted {
            self.edge_count += 1;
        }
        inserted
    }

    /// Removes the undirected edge `{source, target}`, returning `true` when
    /// it existed. Both endpoints remain in the graph.
    pub fn remove_edge(&mut self, source: &N, target: &N) -> bool {
        let removed = self
            .adjacency
            .get_mut(source)
            .is_some_and(|neighbours| neighbours.shift_remove(target));
        if !removed {
            return false;
        }
        if let Some(neighbours) = self.adjacency.get_mut(target) {
            neighbours.shift_remove(source);
        }
        self.edge_count -= 1;
        true
    }

    /// Returns whether the undirected edge `{source, target}` exists.
    #[must_use]
    pub fn has_edge(&self, source: &N, target: &N) -> bool {
        self.adjacency
            .get(source)
            .is_some_and(|neighbours| neighbours.contains(target))
    }

    /// Returns whether `node` belongs to the graph.
    #[must_use]
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Degree of `node`, or `None` when it is absent.
    #[must_use]
    pub fn degree(&self, node: &N) -> Option<usize> {
        self.adjacency.get(node).map(IndexSet::len)
    }

    /// Largest degree in the graph (zero for an empty graph).
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).max().unwrap_or(0)
    }

    /// Neighbours of `node` in insertion order.
    #[must_use]
    pub fn neighbors(&self, node: &N) -> Option<&IndexSet<N>> {
        self.adjacency.get(node)
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.adjacency.keys()
    }

    /// Position of `node` in insertion order.
    #[must_use]
    pub fn node_index(&self, node: &N) -> Option<usize> {
        self.adjacency.get_index_of(node)
    }

    /// Node stored at `index` in insertion order.
    #[must_use]
    pub fn node_at(&self, index: usize) -> Option<&N> {
        self.adjacency.get_index(index).map(|(node, _)| node)
    }

    /// Iterates each undirected edge once.
    ///
    /// Edges are visited node by node in insertion order; within a node the
    /// neighbours appear in insertion order and an edge is reported from the
    /// endpoint inserted first.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(move |(index, (node, neighbours))| {
                neighbours
                    .iter()
                    .filter(move |other| {
                        self.adjacency
                            .get_index_of(*other)
                            .is_some_and(|position| position > index)
                    })
                    .map(move |other| (node, other))
            })
    }

    /// Collects [`Self::edges`] into owned pairs.
    #[must_use]
    pub fn edge_list(&self) -> Vec<(N, N)> {
        self.edges()
            .map(|(source, target)| (source.clone(), target.clone()))
            .collect()
    }

    /// Sorted multiset of node degrees.
    #[must_use]
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = self.adjacency.values().map(IndexSet::len).collect();
        degrees.sort_unstable();
        degrees
    }

    /// Induced subgraph on the nodes accepted by `keep`, preserving order.
    #[must_use]
    pub fn subgraph(&self, mut keep: impl FnMut(&N) -> bool) -> Self {
        let mut subgraph = Self::new();
        for node in self.adjacency.keys() {
            if keep(node) {
                subgraph.add_node(node.clone());
            }
        }
        for (source, target) in self.edges() {
            if subgraph.contains_node(source) && subgraph.contains_node(target) {
                subgraph.add_edge(source.clone(), target.clone());
            }
        }
        subgraph
    }

    /// Neighbour lists expressed as node positions.
    pub(crate) fn index_adjacency(&self) -> Vec<Vec<usize>> {
        self.adjacency
            .values()
            .map(|neighbours| {
                neighbours
                    .iter()
                    .filter_map(|other| self.adjacency.get_index_of(other))
                    .collect()
            })
            .collect()
    }

    /// Number of connected components (zero for an empty graph).
    #[must_use]
    pub fn connected_components(&self) -> usize {
        let mut sets = UnionFind::new(self.node_count());
        for (index, neighbours) in self.index_adjacency().into_iter().enumerate() {
            for other in neighbours {
                sets.union(index, other);
            }
        }
        sets.components()
    }

    /// Returns `true` when the graph is non-empty and has a single component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected_components() == 1
    }
}
