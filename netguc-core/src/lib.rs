//! Netguc core library: graph anonymisation and structural utility.
//!
//! Graphs are loaded from Matrix-Market edge lists, perturbed to hide node
//! identities, and scored by how much of their structure survives. Stages
//! chain through files so each transformation consumes the previous output.

mod error;
mod graph;
pub mod mtx;
pub mod perturb;
mod pipeline;
mod render;
mod transform;
pub mod utility;

pub use crate::{
    error::{
        ConstraintError, ConstraintErrorCode, MtxError, MtxErrorCode, ParameterError,
        ParameterErrorCode, PipelineError, PipelineErrorCode, TransformError, TransformErrorCode,
    },
    graph::{Graph, NodeId, NodeLabel},
    mtx::{Addressing, read_graph, write_graph},
    pipeline::{Pipeline, PipelineBuilder, PipelineReport, StageHalt, StageRecord},
    render::{GraphRenderer, NoopRenderer, RenderFrame},
    transform::{
        TransformKind, TransformOutcome, TransformReport, Transformation, Transformed,
        derive_output_path, run,
    },
};
