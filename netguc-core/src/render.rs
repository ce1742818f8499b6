//! Visualisation sink for transformation results.
//!
//! Drawing is left to the embedding application. Transformations hand a
//! [`RenderFrame`] to a [`GraphRenderer`] once their result is known;
//! implementations must return promptly rather than block until a window
//! closes.

use indexmap::{IndexMap, IndexSet};

use crate::graph::{Graph, NodeId};

/// A graph snapshot offered to a renderer.
#[derive(Clone, Copy, Debug)]
pub struct RenderFrame<'a> {
    title: &'a str,
    graph: &'a Graph,
    highlight: Option<&'a IndexSet<NodeId>>,
    scores: Option<&'a IndexMap<NodeId, f64>>,
}

impl<'a> RenderFrame<'a> {
    /// Creates a frame showing `graph` under `title`.
    #[must_use]
    pub const fn new(title: &'a str, graph: &'a Graph) -> Self {
        Self {
            title,
            graph,
            highlight: None,
            scores: None,
        }
    }

    /// Marks a subset of nodes to emphasise, such as a k-core.
    #[must_use]
    pub const fn with_highlight(mut self, nodes: &'a IndexSet<NodeId>) -> Self {
        self.highlight = Some(nodes);
        self
    }

    /// Attaches per-node scores, such as centrality values, for colouring.
    #[must_use]
    pub const fn with_scores(mut self, scores: &'a IndexMap<NodeId, f64>) -> Self {
        self.scores = Some(scores);
        self
    }

    #[must_use]
    #[rustfmt::skip]
    pub const fn title(&self) -> &'a str { self.title }

    #[must_use]
    #[rustfmt::skip]
    pub const fn graph(&self) -> &'a Graph { self.graph }

    #[must_use]
    #[rustfmt::skip]
    pub const fn highlight(&self) -> Option<&'a IndexSet<NodeId>> { self.highlight }

    #[must_use]
    #[rustfmt::skip]
    pub const fn scores(&self) -> Option<&'a IndexMap<NodeId, f64>> { self.scores }
}

/// Receives frames produced by transformations.
pub trait GraphRenderer {
    /// Displays `frame` without blocking the caller indefinitely.
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Renderer that discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRenderer;

impl GraphRenderer for NoopRenderer {
    fn render(&mut self, _frame: &RenderFrame<'_>) {}
}

impl<R: GraphRenderer + ?Sized> GraphRenderer for &mut R {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        (**self).render(frame);
    }
}
