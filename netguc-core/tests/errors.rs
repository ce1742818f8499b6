use std::{io, path::PathBuf};

use netguc_core::{
    ConstraintError, ConstraintErrorCode, MtxError, MtxErrorCode, ParameterError,
    ParameterErrorCode, PipelineError, PipelineErrorCode, TransformError, TransformErrorCode,
};
use rstest::rstest;

fn sample_path() -> PathBuf {
    PathBuf::from("graphs/sample.mtx")
}

#[rstest]
#[case(
    MtxError::Io { path: sample_path(), source: io::Error::from(io::ErrorKind::NotFound) },
    MtxErrorCode::Io,
    "MTX_IO",
)]
#[case(MtxError::MissingHeader { path: sample_path() }, MtxErrorCode::MissingHeader, "MTX_MISSING_HEADER")]
#[case(
    MtxError::MalformedHeader { path: sample_path(), line: 2, content: "3 3".into() },
    MtxErrorCode::MalformedHeader,
    "MTX_MALFORMED_HEADER",
)]
#[case(
    MtxError::MalformedEdge { path: sample_path(), line: 5, content: "1 x".into() },
    MtxErrorCode::MalformedEdge,
    "MTX_MALFORMED_EDGE",
)]
#[case(
    MtxError::NonIntegerLabel { label: "alice".into() },
    MtxErrorCode::NonIntegerLabel,
    "MTX_NON_INTEGER_LABEL",
)]
fn returns_expected_mtx_code(
    #[case] error: MtxError,
    #[case] expected: MtxErrorCode,
    #[case] text: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(expected.as_str(), text);
    assert_eq!(expected.to_string(), text);
}

#[rstest]
#[case(ConstraintError::EmptyGraph, ConstraintErrorCode::EmptyGraph)]
#[case(ConstraintError::EmptyCore { k: 4, max_core: 2 }, ConstraintErrorCode::EmptyCore)]
#[case(ConstraintError::EmptyShell { k: 1, max_core: 2 }, ConstraintErrorCode::EmptyShell)]
fn returns_expected_constraint_code(
    #[case] error: ConstraintError,
    #[case] expected: ConstraintErrorCode,
) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(
    ParameterError::UnknownTransformation { name: "shuffle".into() },
    ParameterErrorCode::UnknownTransformation,
)]
#[case(
    ParameterError::InvalidValue {
        transformation: "k-core",
        raw: "0.5".into(),
        expected: "core depth",
    },
    ParameterErrorCode::InvalidValue,
)]
#[case(
    ParameterError::ThresholdOutOfRange { value: 2.0 },
    ParameterErrorCode::ThresholdOutOfRange,
)]
fn returns_expected_parameter_code(
    #[case] error: ParameterError,
    #[case] expected: ParameterErrorCode,
) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(
    TransformError::from(MtxError::MissingHeader { path: sample_path() }),
    TransformErrorCode::Mtx,
    "MTX_MISSING_HEADER",
)]
#[case(
    TransformError::from(ConstraintError::EmptyGraph),
    TransformErrorCode::Constraint,
    "CONSTRAINT_EMPTY_GRAPH",
)]
#[case(
    TransformError::from(ParameterError::ThresholdOutOfRange { value: -1.0 }),
    TransformErrorCode::Parameter,
    "PARAMETER_THRESHOLD_OUT_OF_RANGE",
)]
fn transform_errors_expose_wrapped_code(
    #[case] error: TransformError,
    #[case] expected: TransformErrorCode,
    #[case] detail: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.detail_code(), detail);
}

#[test]
fn stage_failure_carries_context() {
    let error = PipelineError::Stage {
        stage: 2,
        transformation: "edge-swap",
        source: TransformError::from(MtxError::MalformedEdge {
            path: sample_path(),
            line: 3,
            content: "1".into(),
        }),
    };
    assert_eq!(error.code(), PipelineErrorCode::StageFailure);
    assert_eq!(error.stage_code(), Some("MTX_MALFORMED_EDGE"));
    let message = error.to_string();
    assert!(message.contains("stage 2"));
    assert!(message.contains("edge-swap"));
    assert!(message.contains("graphs/sample.mtx"));
}

#[test]
fn empty_pipeline_has_no_stage_code() {
    let error = PipelineError::EmptyPipeline;
    assert_eq!(error.code(), PipelineErrorCode::EmptyPipeline);
    assert_eq!(error.code().as_str(), "PIPELINE_EMPTY");
    assert_eq!(error.stage_code(), None);
}
