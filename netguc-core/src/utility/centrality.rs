use std::{collections::VecDeque, fmt};

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use super::ratio;
use crate::{
    error::{ConstraintError, ParameterError},
    graph::{Graph, NodeId},
};

/// A centrality score threshold in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Validates `value` as a threshold.
    ///
    /// # Errors
    /// Returns [`ParameterError::ThresholdOutOfRange`] when `value` is not a
    /// finite number in `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use netguc_core::utility::Threshold;
    ///
    /// assert!(Threshold::new(0.25).is_ok());
    /// assert!(Threshold::new(1.5).is_err());
    /// assert!(Threshold::new(f64::NAN).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, ParameterError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParameterError::ThresholdOutOfRange { value })
        }
    }

    /// Returns the threshold value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shortest-path centrality measure used for utility scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CentralityMeasure {
    /// Normalised fraction of shortest paths passing through a node.
    Betweenness,
    /// Normalised inverse mean distance to reachable nodes.
    Closeness,
}

impl CentralityMeasure {
    /// Scores every node of `graph` in graph order.
    #[must_use]
    pub fn scores(self, graph: &Graph) -> IndexMap<NodeId, f64> {
        match self {
            Self::Betweenness => betweenness_centrality(graph),
            Self::Closeness => closeness_centrality(graph),
        }
    }
}

impl fmt::Display for CentralityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
        })
    }
}

/// Scores and utility of a centrality threshold evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct CentralityReport {
    /// Measure that produced the scores.
    pub measure: CentralityMeasure,
    /// Score of every node in graph order.
    pub scores: IndexMap<NodeId, f64>,
    /// Threshold a node must reach to survive.
    pub threshold: Threshold,
    /// Nodes scoring at least the threshold.
    pub surviving: usize,
    /// Mean score across all nodes.
    pub average: f64,
    /// `surviving / node count`.
    pub utility: f64,
}

/// Normalised betweenness centrality of every node.
///
/// Uses Brandes' accumulation over breadth-first searches. Scores are scaled
/// by `1 / ((n - 1)(n - 2))` when the graph has more than two nodes, so the
/// centre of a star scores exactly one.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, utility::betweenness_centrality};
///
/// let scores = betweenness_centrality(&Graph::from_edges([(1, 2), (2, 3)]));
/// assert_eq!(scores.values().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 0.0]);
/// ```
#[must_use]
pub fn betweenness_centrality(graph: &Graph) -> IndexMap<NodeId, f64> {
    let adjacency = graph.index_adjacency();
    let n = adjacency.len();
    let mut totals = vec![0.0_f64; n];

    for source in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut paths = vec![0.0_f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        paths[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            let next = distance[node].map_or(0, |d| d + 1);
            for &neighbour in &adjacency[node] {
                if distance[neighbour].is_none() {
                    distance[neighbour] = Some(next);
                    queue.push_back(neighbour);
                }
                if distance[neighbour] == Some(next) {
                    paths[neighbour] += paths[node];
                    predecessors[neighbour].push(node);
                }
            }
        }

        let mut dependency = vec![0.0_f64; n];
        for &node in order.iter().rev() {
            for &predecessor in &predecessors[node] {
                dependency[predecessor] +=
                    paths[predecessor] / paths[node] * (1.0 + dependency[node]);
            }
            if node != source {
                totals[node] += dependency[node];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for total in &mut totals {
            *total *= scale;
        }
    }
    graph.nodes().copied().zip(totals).collect()
}

/// Normalised closeness centrality of every node.
///
/// For a node reaching `r - 1` others at total distance `d` in a graph of
/// `n` nodes the score is `((r - 1) / d) * ((r - 1) / (n - 1))`, so nodes in
/// small components are penalised. A node reaching nothing scores zero.
///
/// # Examples
/// ```
/// use netguc_core::{Graph, utility::closeness_centrality};
///
/// let scores = closeness_centrality(&Graph::from_edges([(1, 2), (2, 3)]));
/// let values: Vec<f64> = scores.values().copied().collect();
/// assert_eq!(values[1], 1.0);
/// assert!((values[0] - 2.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn closeness_centrality(graph: &Graph) -> IndexMap<NodeId, f64> {
    let adjacency = graph.index_adjacency();
    let n = adjacency.len();

    let scores = (0..n).map(|source| {
        let mut distance: Vec<Option<usize>> = vec![None; n];
        distance[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        let mut reached = 0_usize;
        let mut total = 0_usize;
        while let Some(node) = queue.pop_front() {
            let next = distance[node].map_or(0, |d| d + 1);
            for &neighbour in &adjacency[node] {
                if distance[neighbour].is_none() {
                    distance[neighbour] = Some(next);
                    reached += 1;
                    total += next;
                    queue.push_back(neighbour);
                }
            }
        }
        if total == 0 || n < 2 {
            return 0.0;
        }
        let reached = reached as f64;
        (reached / total as f64) * (reached / (n - 1) as f64)
    });
    graph.nodes().copied().zip(scores).collect()
}

/// Fraction of nodes whose `measure` score reaches `threshold`.
///
/// # Errors
/// Returns [`ConstraintError::EmptyGraph`] when the graph has no nodes.
#[instrument(
    name = "utility.centrality",
    err,
    skip(graph),
    fields(nodes = graph.node_count(), measure = %measure, threshold = %threshold),
)]
pub fn centrality_utility(
    graph: &Graph,
    measure: CentralityMeasure,
    threshold: Threshold,
) -> Result<CentralityReport, ConstraintError> {
    if graph.is_empty() {
        return Err(ConstraintError::EmptyGraph);
    }
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "computing centrality"
    );

    let scores = measure.scores(graph);
    for (node, score) in &scores {
        debug!(node, score, "centrality score");
    }
    let average = scores.values().sum::<f64>() / scores.len() as f64;
    let surviving = scores
        .values()
        .filter(|score| **score >= threshold.get())
        .count();
    let utility = ratio(surviving, scores.len());
    info!(average, surviving, utility, "centrality utility");

    Ok(CentralityReport {
        measure,
        scores,
        threshold,
        surviving,
        average,
        utility,
    })
}
