//! Error types for the netguc core library.
//!
//! Every enum exposes a stable machine-readable code so drivers can log and
//! match failures without parsing messages.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while reading or writing Matrix-Market edge lists.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MtxError {
    /// The file could not be read, created, or written.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file contained no non-comment lines.
    #[error("`{path}` has no header line")]
    MissingHeader {
        /// File that lacked a header.
        path: PathBuf,
    },
    /// The header line did not start with three integers.
    #[error("`{path}` line {line}: header `{content}` must hold three integers")]
    MalformedHeader {
        /// File containing the malformed header.
        path: PathBuf,
        /// One-based physical line number.
        line: usize,
        /// Raw header text.
        content: String,
    },
    /// An edge line did not start with two integers.
    #[error("`{path}` line {line}: edge `{content}` must hold two integers")]
    MalformedEdge {
        /// File containing the malformed edge.
        path: PathBuf,
        /// One-based physical line number.
        line: usize,
        /// Raw edge text.
        content: String,
    },
    /// A node label could not be written verbatim because it is not an integer.
    #[error("node label `{label}` is not an integer; use one-based addressing to remap it")]
    NonIntegerLabel {
        /// Display form of the offending label.
        label: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`MtxError`] variants.
    enum MtxErrorCode for MtxError {
        /// The file could not be read, created, or written.
        Io => Io { .. } => "MTX_IO",
        /// The file contained no non-comment lines.
        MissingHeader => MissingHeader { .. } => "MTX_MISSING_HEADER",
        /// The header line did not start with three integers.
        MalformedHeader => MalformedHeader { .. } => "MTX_MALFORMED_HEADER",
        /// An edge line did not start with two integers.
        MalformedEdge => MalformedEdge { .. } => "MTX_MALFORMED_EDGE",
        /// A node label is not an integer.
        NonIntegerLabel => NonIntegerLabel { .. } => "MTX_NON_INTEGER_LABEL",
    }
}

impl MtxError {
    /// Returns `true` for malformed-content failures as opposed to I/O or
    /// label failures.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MissingHeader { .. } | Self::MalformedHeader { .. } | Self::MalformedEdge { .. }
        )
    }
}

/// A structural parameter is not feasible for the loaded graph.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConstraintError {
    /// The graph has no nodes, so no utility score is defined.
    #[error("graph has no nodes")]
    EmptyGraph,
    /// No node survives peeling down to the requested core.
    #[error("the {k}-core is empty (maximum core number is {max_core})")]
    EmptyCore {
        /// Requested core depth.
        k: usize,
        /// Largest core number present in the graph.
        max_core: usize,
    },
    /// No node has a core number of exactly `k`.
    #[error("no nodes lie exactly in the {k}-shell (maximum core number is {max_core})")]
    EmptyShell {
        /// Requested shell depth.
        k: usize,
        /// Largest core number present in the graph.
        max_core: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ConstraintError`] variants.
    enum ConstraintErrorCode for ConstraintError {
        /// The graph has no nodes.
        EmptyGraph => EmptyGraph => "CONSTRAINT_EMPTY_GRAPH",
        /// The requested core is empty.
        EmptyCore => EmptyCore { .. } => "CONSTRAINT_EMPTY_CORE",
        /// The requested shell is empty.
        EmptyShell => EmptyShell { .. } => "CONSTRAINT_EMPTY_SHELL",
    }
}

/// A transformation name or raw parameter could not be interpreted.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// No transformation is registered under the supplied name.
    #[error("unknown transformation `{name}`")]
    UnknownTransformation {
        /// Name supplied by the caller.
        name: String,
    },
    /// The raw parameter did not parse as the type the transformation needs.
    #[error("`{raw}` is not a valid {expected} for `{transformation}`")]
    InvalidValue {
        /// Transformation the parameter was destined for.
        transformation: &'static str,
        /// Raw text supplied by the caller.
        raw: String,
        /// Human-readable description of the expected parameter.
        expected: &'static str,
    },
    /// A centrality threshold fell outside `[0, 1]` or was not finite.
    #[error("centrality threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange {
        /// Rejected threshold.
        value: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`ParameterError`] variants.
    enum ParameterErrorCode for ParameterError {
        /// Unknown transformation name.
        UnknownTransformation => UnknownTransformation { .. } => "PARAMETER_UNKNOWN_TRANSFORMATION",
        /// Raw parameter failed to parse.
        InvalidValue => InvalidValue { .. } => "PARAMETER_INVALID_VALUE",
        /// Threshold outside the unit interval.
        ThresholdOutOfRange => ThresholdOutOfRange { .. } => "PARAMETER_THRESHOLD_OUT_OF_RANGE",
    }
}

/// Error returned by a single transformation run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading the input or writing the output failed.
    #[error(transparent)]
    Mtx(#[from] MtxError),
    /// The structural parameter is infeasible for the graph.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    /// The transformation or its parameter was invalid.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

define_error_codes! {
    /// Stable codes describing [`TransformError`] variants.
    enum TransformErrorCode for TransformError {
        /// Codec failure.
        Mtx => Mtx(..) => "TRANSFORM_MTX",
        /// Infeasible structural parameter.
        Constraint => Constraint(..) => "TRANSFORM_CONSTRAINT",
        /// Invalid transformation or parameter.
        Parameter => Parameter(..) => "TRANSFORM_PARAMETER",
    }
}

impl TransformError {
    /// Retrieve the code of the wrapped error.
    ///
    /// # Examples
    /// ```
    /// use netguc_core::{ConstraintError, TransformError};
    ///
    /// let err = TransformError::from(ConstraintError::EmptyGraph);
    /// assert_eq!(err.code().as_str(), "TRANSFORM_CONSTRAINT");
    /// assert_eq!(err.detail_code(), "CONSTRAINT_EMPTY_GRAPH");
    /// ```
    #[must_use]
    pub const fn detail_code(&self) -> &'static str {
        match self {
            Self::Mtx(error) => error.code().as_str(),
            Self::Constraint(error) => error.code().as_str(),
            Self::Parameter(error) => error.code().as_str(),
        }
    }
}

/// Error produced while configuring or running a [`crate::Pipeline`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline was built without any stages.
    #[error("pipeline requires at least one stage")]
    EmptyPipeline,
    /// A stage failed; later stages were not run and earlier outputs remain.
    #[error("stage {stage} (`{transformation}`) failed: {source}")]
    Stage {
        /// Zero-based index of the failing stage.
        stage: usize,
        /// Registered name of the failing transformation.
        transformation: &'static str,
        /// Underlying failure.
        #[source]
        source: TransformError,
    },
}

define_error_codes! {
    /// Stable codes describing [`PipelineError`] variants.
    enum PipelineErrorCode for PipelineError {
        /// The pipeline has no stages.
        EmptyPipeline => EmptyPipeline => "PIPELINE_EMPTY",
        /// A stage failed.
        StageFailure => Stage { .. } => "PIPELINE_STAGE_FAILURE",
    }
}

impl PipelineError {
    /// Retrieve the detail code of the failing stage, if any.
    #[must_use]
    pub const fn stage_code(&self) -> Option<&'static str> {
        match self {
            Self::Stage { source, .. } => Some(source.detail_code()),
            Self::EmptyPipeline => None,
        }
    }
}
