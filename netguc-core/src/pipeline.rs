//! Chains transformations so each stage consumes the previous stage's file.
//!
//! A stage that writes no file (every utility measure) leaves the current
//! path unchanged for the next stage. A [`ConstraintError`] ends the run
//! gracefully and is recorded in the report; any other failure aborts with
//! [`PipelineError::Stage`]. Files written by earlier stages are never
//! removed.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{info, info_span, instrument, warn};

use crate::{
    error::{ConstraintError, PipelineError, TransformError},
    render::{GraphRenderer, NoopRenderer},
    transform::{TransformReport, Transformation},
};

/// Configures and constructs a [`Pipeline`].
///
/// # Examples
/// ```
/// use netguc_core::{PipelineBuilder, Transformation};
///
/// let pipeline = PipelineBuilder::new()
///     .with_stage(Transformation::NaiveRelabel)
///     .with_stage(Transformation::KCore { k: 2 })
///     .with_seed(42)
///     .build()
///     .expect("pipeline has stages");
/// assert_eq!(pipeline.stages().len(), 2);
/// assert_eq!(pipeline.seed(), Some(42));
/// ```
pub struct PipelineBuilder {
    stages: Vec<Transformation>,
    seed: Option<u64>,
    renderer: Box<dyn GraphRenderer>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            seed: None,
            renderer: Box::new(NoopRenderer),
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a builder with no stages, no seed and a no-op renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: Transformation) -> Self {
        self.stages.push(stage);
        self
    }

    /// Appends several stages in order.
    #[must_use]
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Transformation>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Seeds the random source shared by every stage.
    ///
    /// Without a seed each run draws fresh entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the renderer that receives one frame per stage.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn GraphRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validates the configuration and constructs a [`Pipeline`].
    ///
    /// # Errors
    /// Returns [`PipelineError::EmptyPipeline`] when no stage was added.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        Ok(Pipeline {
            stages: self.stages,
            seed: self.seed,
            renderer: self.renderer,
        })
    }
}

/// An ordered list of transformations run against one input file.
pub struct Pipeline {
    stages: Vec<Transformation>,
    seed: Option<u64>,
    renderer: Box<dyn GraphRenderer>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Transformation] {
        &self.stages
    }

    /// Configured seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Runs every stage, starting from `input`.
    ///
    /// Each stage runs inside a `pipeline.stage` span so its diagnostics are
    /// attributed to it; the span closes on every exit path.
    ///
    /// # Errors
    /// Returns [`PipelineError::Stage`] when a stage fails to read or write
    /// its file. Constraint failures are not errors; see
    /// [`PipelineReport::halted`].
    #[instrument(
        name = "pipeline.run",
        err,
        skip(self),
        fields(input = %input.display(), stages = self.stages.len(), seed = ?self.seed),
    )]
    pub fn run(&mut self, input: &Path) -> Result<PipelineReport, PipelineError> {
        let mut rng = self
            .seed
            .map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);
        let mut current = input.to_path_buf();
        let mut records = Vec::with_capacity(self.stages.len());

        for (index, transformation) in self.stages.iter().enumerate() {
            let name = transformation.kind().name();
            let span = info_span!(
                "pipeline.stage",
                stage = index,
                transformation = name,
                input = %current.display(),
            );
            let _entered = span.enter();

            match transformation.run_file(&current, &mut rng, self.renderer.as_mut()) {
                Ok(outcome) => {
                    let stage_input = current.clone();
                    if let Some(output) = &outcome.output {
                        current.clone_from(output);
                    } else {
                        info!("stage wrote no file; next stage reuses its input");
                    }
                    records.push(StageRecord {
                        stage: index,
                        transformation: *transformation,
                        input: stage_input,
                        output: outcome.output,
                        report: outcome.report,
                    });
                }
                Err(TransformError::Constraint(reason)) => {
                    warn!(code = %reason.code(), reason = %reason, "stage halted the pipeline");
                    return Ok(PipelineReport {
                        stages: records,
                        halted: Some(StageHalt {
                            stage: index,
                            transformation: name,
                            reason,
                        }),
                        final_path: current,
                    });
                }
                Err(source) => {
                    return Err(PipelineError::Stage {
                        stage: index,
                        transformation: name,
                        source,
                    });
                }
            }
        }

        info!(final_path = %current.display(), "pipeline complete");
        Ok(PipelineReport {
            stages: records,
            halted: None,
            final_path: current,
        })
    }
}

/// What one completed stage did.
#[derive(Clone, Debug, PartialEq)]
pub struct StageRecord {
    /// Zero-based stage index.
    pub stage: usize,
    /// Transformation that ran.
    pub transformation: Transformation,
    /// File the stage read.
    pub input: PathBuf,
    /// File the stage wrote, if any.
    pub output: Option<PathBuf>,
    /// Statistics the stage produced.
    pub report: TransformReport,
}

/// A stage whose structural parameter was infeasible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageHalt {
    /// Zero-based stage index.
    pub stage: usize,
    /// Registered name of the transformation.
    pub transformation: &'static str,
    /// Why the stage produced no result.
    pub reason: ConstraintError,
}

/// Summary of a [`Pipeline::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    stages: Vec<StageRecord>,
    halted: Option<StageHalt>,
    final_path: PathBuf,
}

impl PipelineReport {
    /// Stages that completed, in order.
    #[must_use]
    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    /// The stage that stopped the run early, if any.
    #[must_use]
    pub fn halted(&self) -> Option<&StageHalt> {
        self.halted.as_ref()
    }

    /// Last file written, or the original input when no stage wrote one.
    #[must_use]
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Returns `true` when every stage ran.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.halted.is_none()
    }
}
