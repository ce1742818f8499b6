//! Structural utility measures: how much of a graph's structure survives.
//!
//! Core decomposition scores the share of nodes in a k-core or k-shell;
//! centrality scoring reports the share of nodes whose betweenness or
//! closeness reaches a threshold.

mod centrality;
mod decomposition;

pub use self::{
    centrality::{
        CentralityMeasure, CentralityReport, Threshold, betweenness_centrality,
        centrality_utility, closeness_centrality,
    },
    decomposition::{Structure, StructureReport, core_numbers, k_core, k_shell},
};

/// `part / whole`, or zero when `whole` is zero.
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}
