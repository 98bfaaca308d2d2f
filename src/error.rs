use thiserror::Error;

use crate::kernel::BooleanOp;

/// Top-level error type for joint synthesis.
///
/// Only precondition violations surface as errors. Geometric and boolean
/// failures during generation are reported through
/// [`JointOutcome::Unchanged`](crate::joint::JointOutcome) instead.
#[derive(Debug, Error)]
pub enum JoineryError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Errors related to joint parameter values.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter {parameter} = {value} must be finite")]
    NotFinite { parameter: &'static str, value: f64 },

    #[error("invalid parameter document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to the inputs of a joint or assembly.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("intersection region set is empty")]
    EmptyIntersection,

    #[error("joint kind {0} is not implemented")]
    UnsupportedKind(&'static str),

    #[error("{identities} identities given for {solids} solids")]
    LengthMismatch { solids: usize, identities: usize },

    #[error("object not found in document")]
    ObjectNotFound,
}

/// Errors reported by a [`GeometryKernel`](crate::kernel::GeometryKernel)
/// implementation.
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("invalid kernel input: {0}")]
    InvalidInput(String),

    #[error("kernel operation failed: {0}")]
    Failed(String),
}

/// Why a joint generation left both parts unmodified.
#[derive(Debug, Clone, Error)]
pub enum JointFailure {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("boolean {op} returned no solids")]
    EmptyBoolean { op: BooleanOp },

    #[error("only {built}/6 prism faces could be built")]
    FaceConstruction { built: usize },

    #[error("prism faces did not join into a single closed solid")]
    FaceJoin,

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Convenience type alias for results using [`JoineryError`].
pub type Result<T> = std::result::Result<T, JoineryError>;
