//! Registry of named transformations and their typed parameters.
//!
//! A user supplies a transformation name and a raw `k`. What `k` means
//! depends on the transformation: an iteration budget, a walk length, a core
//! depth or a centrality threshold. [`Transformation::from_raw`] turns the
//! pair into a value whose parameter already has the right type, so a
//! threshold can never reach an algorithm that expects an iteration count.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{error, info, instrument};

use crate::{
    error::{ConstraintError, ParameterError, TransformError},
    graph::Graph,
    mtx::{self, Addressing},
    perturb::{
        PerturbationStats, RewiringReport, double_edge_swap, random_switch, random_walk_rewire,
        relabel_sequential,
    },
    render::{GraphRenderer, NoopRenderer, RenderFrame},
    utility::{
        CentralityMeasure, CentralityReport, StructureReport, Threshold, centrality_utility,
        k_core, k_shell,
    },
};

/// Names every transformation the library can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Dense zero-based relabeling.
    NaiveRelabel,
    /// Degree-preserving double-edge swaps.
    EdgeSwap,
    /// Random edge addition paired with random removal.
    RandomSwitch,
    /// Random-walk edge rewiring.
    RandomWalk,
    /// K-core utility.
    KCore,
    /// K-shell utility.
    KShell,
    /// Betweenness threshold utility.
    Betweenness,
    /// Closeness threshold utility.
    Closeness,
}

impl TransformKind {
    /// Every registered kind, in listing order.
    pub const ALL: [Self; 8] = [
        Self::NaiveRelabel,
        Self::EdgeSwap,
        Self::RandomSwitch,
        Self::RandomWalk,
        Self::KCore,
        Self::KShell,
        Self::Betweenness,
        Self::Closeness,
    ];

    /// Registered name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NaiveRelabel => "naive-relabel",
            Self::EdgeSwap => "edge-swap",
            Self::RandomSwitch => "random-switch",
            Self::RandomWalk => "random-walk",
            Self::KCore => "k-core",
            Self::KShell => "k-shell",
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NaiveRelabel => "replace node labels with 0..n-1 in node order",
            Self::EdgeSwap => "degree-preserving double-edge swaps",
            Self::RandomSwitch => "add a random absent edge and delete a random edge",
            Self::RandomWalk => "rewire each edge to the end of a random walk",
            Self::KCore => "share of nodes in the k-core",
            Self::KShell => "share of nodes in the k-shell",
            Self::Betweenness => "share of nodes with betweenness at least k",
            Self::Closeness => "share of nodes with closeness at least k",
        }
    }

    /// What the raw `k` means for this kind.
    #[must_use]
    pub const fn parameter(self) -> &'static str {
        match self {
            Self::NaiveRelabel => "unused",
            Self::EdgeSwap | Self::RandomSwitch => "iteration count",
            Self::RandomWalk => "walk length",
            Self::KCore | Self::KShell => "core depth",
            Self::Betweenness | Self::Closeness => "threshold in [0, 1]",
        }
    }

    /// Raw `k` used when a stage does not supply one.
    ///
    /// Every default is accepted by [`Transformation::from_raw`].
    ///
    /// # Examples
    /// ```
    /// use netguc_core::{TransformKind, Transformation};
    ///
    /// for kind in TransformKind::ALL {
    ///     assert!(Transformation::from_raw(kind, kind.default_parameter()).is_ok());
    /// }
    /// assert_eq!(TransformKind::Closeness.default_parameter(), "0.5");
    /// ```
    #[must_use]
    pub const fn default_parameter(self) -> &'static str {
        match self {
            Self::NaiveRelabel
            | Self::EdgeSwap
            | Self::RandomSwitch
            | Self::RandomWalk
            | Self::KCore
            | Self::KShell => "10",
            Self::Betweenness | Self::Closeness => "0.5",
        }
    }

    /// Suffix appended to the input stem when this kind writes a graph.
    #[must_use]
    pub const fn output_suffix(self) -> Option<&'static str> {
        match self {
            Self::NaiveRelabel => Some("anonymized"),
            Self::EdgeSwap => Some("randadddel"),
            Self::RandomSwitch => Some("randswitch"),
            Self::RandomWalk => Some("randwalk"),
            Self::KCore | Self::KShell | Self::Betweenness | Self::Closeness => None,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = ParameterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParameterError::UnknownTransformation {
                name: wanted.to_owned(),
            })
    }
}

/// A transformation together with its typed parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transformation {
    /// Dense zero-based relabeling.
    NaiveRelabel,
    /// Up to `iterations` double-edge swap attempts.
    EdgeSwap {
        /// Attempt budget.
        iterations: usize,
    },
    /// Up to `iterations` add-then-remove switches.
    RandomSwitch {
        /// Iteration budget.
        iterations: usize,
    },
    /// Random-walk rewiring with walks of `walk_length` steps.
    RandomWalk {
        /// Steps per walk.
        walk_length: usize,
    },
    /// K-core utility at depth `k`.
    KCore {
        /// Core depth.
        k: usize,
    },
    /// K-shell utility at depth `k`.
    KShell {
        /// Shell depth.
        k: usize,
    },
    /// Centrality threshold utility.
    Centrality {
        /// Measure to score nodes with.
        measure: CentralityMeasure,
        /// Score a node must reach to survive.
        threshold: Threshold,
    },
}

impl Transformation {
    /// Interprets the raw `k` according to `kind`.
    ///
    /// # Errors
    /// Returns [`ParameterError::InvalidValue`] when `raw` does not parse as
    /// the parameter `kind` expects and
    /// [`ParameterError::ThresholdOutOfRange`] for a centrality threshold
    /// outside `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use netguc_core::{TransformKind, Transformation};
    ///
    /// let swap = Transformation::from_raw(TransformKind::EdgeSwap, "25")?;
    /// assert_eq!(swap, Transformation::EdgeSwap { iterations: 25 });
    /// assert!(Transformation::from_raw(TransformKind::KCore, "0.5").is_err());
    /// assert!(Transformation::from_raw(TransformKind::Closeness, "0.5").is_ok());
    /// # Ok::<(), netguc_core::ParameterError>(())
    /// ```
    pub fn from_raw(kind: TransformKind, raw: &str) -> Result<Self, ParameterError> {
        let count = || {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ParameterError::InvalidValue {
                    transformation: kind.name(),
                    raw: raw.to_owned(),
                    expected: kind.parameter(),
                })
        };
        let threshold = || {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ParameterError::InvalidValue {
                    transformation: kind.name(),
                    raw: raw.to_owned(),
                    expected: kind.parameter(),
                })?;
            Threshold::new(value)
        };

        Ok(match kind {
            TransformKind::NaiveRelabel => Self::NaiveRelabel,
            TransformKind::EdgeSwap => Self::EdgeSwap {
                iterations: count()?,
            },
            TransformKind::RandomSwitch => Self::RandomSwitch {
                iterations: count()?,
            },
            TransformKind::RandomWalk => Self::RandomWalk {
                walk_length: count()?,
            },
            TransformKind::KCore => Self::KCore { k: count()? },
            TransformKind::KShell => Self::KShell { k: count()? },
            TransformKind::Betweenness => Self::Centrality {
                measure: CentralityMeasure::Betweenness,
                threshold: threshold()?,
            },
            TransformKind::Closeness => Self::Centrality {
                measure: CentralityMeasure::Closeness,
                threshold: threshold()?,
            },
        })
    }

    /// Registry entry this transformation belongs to.
    #[must_use]
    pub const fn kind(&self) -> TransformKind {
        match self {
            Self::NaiveRelabel => TransformKind::NaiveRelabel,
            Self::EdgeSwap { .. } => TransformKind::EdgeSwap,
            Self::RandomSwitch { .. } => TransformKind::RandomSwitch,
            Self::RandomWalk { .. } => TransformKind::RandomWalk,
            Self::KCore { .. } => TransformKind::KCore,
            Self::KShell { .. } => TransformKind::KShell,
            Self::Centrality {
                measure: CentralityMeasure::Betweenness,
                ..
            } => TransformKind::Betweenness,
            Self::Centrality {
                measure: CentralityMeasure::Closeness,
                ..
            } => TransformKind::Closeness,
        }
    }

    /// Applies the transformation to an in-memory graph.
    ///
    /// Perturbations return the perturbed graph; utility measures return
    /// only a report.
    ///
    /// # Errors
    /// Returns a [`ConstraintError`] when a utility measure is undefined for
    /// `graph`.
    pub fn apply<R>(&self, graph: &Graph, rng: &mut R) -> Result<Transformed, ConstraintError>
    where
        R: Rng + ?Sized,
    {
        Ok(match *self {
            Self::NaiveRelabel => {
                let relabeled = relabel_sequential(graph);
                let report = TransformReport::Relabeled {
                    nodes: relabeled.node_count(),
                    edges: relabeled.edge_count(),
                };
                Transformed::with_graph(relabeled, report)
            }
            Self::EdgeSwap { iterations } => {
                let (swapped, stats) = double_edge_swap(graph, iterations, rng);
                Transformed::with_graph(swapped, TransformReport::Perturbed(stats))
            }
            Self::RandomSwitch { iterations } => {
                let (switched, stats) = random_switch(graph, iterations, rng);
                Transformed::with_graph(switched, TransformReport::Perturbed(stats))
            }
            Self::RandomWalk { walk_length } => {
                let (rewired, report) = random_walk_rewire(graph, walk_length, rng);
                Transformed::with_graph(rewired, TransformReport::Rewired(report))
            }
            Self::KCore { k } => Transformed::report_only(TransformReport::Structure(
                k_core(graph, k)?,
            )),
            Self::KShell { k } => Transformed::report_only(TransformReport::Structure(
                k_shell(graph, k)?,
            )),
            Self::Centrality { measure, threshold } => Transformed::report_only(
                TransformReport::Centrality(centrality_utility(graph, measure, threshold)?),
            ),
        })
    }

    /// Reads `input`, applies the transformation, renders the result and,
    /// for perturbations, writes the perturbed graph next to `input`.
    ///
    /// # Errors
    /// Returns [`TransformError::Mtx`] when reading or writing fails and
    /// [`TransformError::Constraint`] when a utility measure is undefined.
    #[instrument(
        name = "transform.run",
        err,
        skip(self, rng, renderer),
        fields(transformation = self.kind().name(), input = %input.display()),
    )]
    pub fn run_file<R, V>(
        &self,
        input: &Path,
        rng: &mut R,
        renderer: &mut V,
    ) -> Result<TransformOutcome, TransformError>
    where
        R: Rng + ?Sized,
        V: GraphRenderer + ?Sized,
    {
        let graph = mtx::read_graph(input)?;
        let transformed = self.apply(&graph, rng)?;
        let title = self.title();
        renderer.render(&transformed.frame(&title, &graph));

        let output = match (&transformed.graph, self.kind().output_suffix()) {
            (Some(result), Some(suffix)) => {
                let destination = derive_output_path(input, suffix);
                let comment = format!("{} output", self.kind().name());
                let written =
                    mtx::write_graph(result, &destination, Some(&comment), Addressing::Passthrough)?;
                info!(output = %written.display(), "saved transformed graph");
                Some(written)
            }
            _ => None,
        };
        Ok(TransformOutcome {
            output,
            report: transformed.report,
        })
    }

    fn title(&self) -> String {
        match *self {
            Self::NaiveRelabel => TransformKind::NaiveRelabel.name().to_owned(),
            Self::EdgeSwap { iterations } | Self::RandomSwitch { iterations } => {
                format!("{} (k={iterations})", self.kind())
            }
            Self::RandomWalk { walk_length } => format!("{} (k={walk_length})", self.kind()),
            Self::KCore { k } | Self::KShell { k } => format!("{} (k={k})", self.kind()),
            Self::Centrality { threshold, .. } => format!("{} (k={threshold})", self.kind()),
        }
    }
}

/// Statistics produced by a transformation.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformReport {
    /// Labels were replaced; structure is unchanged.
    Relabeled {
        /// Node count of the relabeled graph.
        nodes: usize,
        /// Edge count of the relabeled graph.
        edges: usize,
    },
    /// An iteration-bounded perturbation ran.
    Perturbed(PerturbationStats),
    /// Random-walk rewiring ran.
    Rewired(RewiringReport),
    /// A k-core or k-shell was measured.
    Structure(StructureReport),
    /// A centrality threshold was measured.
    Centrality(CentralityReport),
}

impl TransformReport {
    /// Utility score for measurement reports.
    #[must_use]
    pub fn utility(&self) -> Option<f64> {
        match self {
            Self::Structure(report) => Some(report.utility),
            Self::Centrality(report) => Some(report.utility),
            Self::Relabeled { .. } | Self::Perturbed(_) | Self::Rewired(_) => None,
        }
    }
}

/// In-memory result of [`Transformation::apply`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    /// Perturbed graph, absent for utility measures.
    pub graph: Option<Graph>,
    /// Statistics describing the run.
    pub report: TransformReport,
}

impl Transformed {
    fn with_graph(graph: Graph, report: TransformReport) -> Self {
        Self {
            graph: Some(graph),
            report,
        }
    }

    fn report_only(report: TransformReport) -> Self {
        Self {
            graph: None,
            report,
        }
    }

    fn frame<'a>(&'a self, title: &'a str, original: &'a Graph) -> RenderFrame<'a> {
        let frame = RenderFrame::new(title, self.graph.as_ref().unwrap_or(original));
        match &self.report {
            TransformReport::Structure(report) => frame.with_highlight(&report.members),
            TransformReport::Centrality(report) => frame.with_scores(&report.scores),
            TransformReport::Relabeled { .. }
            | TransformReport::Perturbed(_)
            | TransformReport::Rewired(_) => frame,
        }
    }
}

/// Result of [`Transformation::run_file`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransformOutcome {
    /// File written by a perturbation; `None` for utility measures.
    pub output: Option<PathBuf>,
    /// Statistics describing the run.
    pub report: TransformReport,
}

/// Path `<dir>/<stem>_<suffix>.mtx` beside `input`.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use netguc_core::derive_output_path;
///
/// let out = derive_output_path(Path::new("data/karate.mtx"), "randswitch");
/// assert_eq!(out, Path::new("data/karate_randswitch.mtx"));
/// ```
#[must_use]
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "graph".into(), |stem| stem.to_string_lossy());
    input.with_file_name(format!("{stem}_{suffix}.mtx"))
}

/// Runs `kind` on `input` with the raw `k`, returning the written path.
///
/// Failures are logged and reported as `None`, as are utility measures,
/// which never write a file. Randomness comes from system entropy.
#[must_use]
pub fn run(kind: TransformKind, input: &Path, raw_k: &str) -> Option<PathBuf> {
    let outcome = Transformation::from_raw(kind, raw_k)
        .map_err(TransformError::from)
        .and_then(|transformation| {
            transformation.run_file(input, &mut SmallRng::from_entropy(), &mut NoopRenderer)
        });
    match outcome {
        Ok(outcome) => outcome.output,
        Err(err) => {
            error!(
                transformation = kind.name(),
                code = %err.code(),
                detail = err.detail_code(),
                error = %err,
                "transformation failed"
            );
            None
        }
    }
}
