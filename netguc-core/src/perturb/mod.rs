//! Graph perturbations used to anonymise an edge list.
//!
//! Every perturbation takes the loaded graph by reference and returns a new
//! working copy, so callers always keep the original for reference
//! statistics. Randomised perturbations draw from a caller-supplied [`Rng`]
//! which the pipeline seeds when reproducibility is requested.
//!
//! [`Rng`]: rand::Rng

mod edge_swap;
mod random_switch;
mod random_walk;
mod relabel;

pub use self::{
    edge_swap::double_edge_swap,
    random_switch::random_switch,
    random_walk::{RewiringReport, random_walk_rewire},
    relabel::relabel_sequential,
};

/// Counters describing an iteration-bounded perturbation.
///
/// `requested` is the iteration budget; `applied` counts iterations that
/// actually mutated the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerturbationStats {
    requested: usize,
    applied: usize,
    edges_before: usize,
    edges_after: usize,
}

impl PerturbationStats {
    pub(crate) fn new(requested: usize, edges_before: usize) -> Self {
        Self {
            requested,
            applied: 0,
            edges_before,
            edges_after: edges_before,
        }
    }

    pub(crate) fn record_applied(&mut self) {
        self.applied += 1;
    }

    pub(crate) fn finish(mut self, edges_after: usize) -> Self {
        self.edges_after = edges_after;
        self
    }

    /// Iteration budget supplied by the caller.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Iterations that mutated the graph.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Edge count of the input graph.
    #[must_use]
    pub fn edges_before(&self) -> usize {
        self.edges_before
    }

    /// Edge count of the perturbed graph.
    #[must_use]
    pub fn edges_after(&self) -> usize {
        self.edges_after
    }
}
