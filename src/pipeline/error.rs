use thiserror::Error;

/// Failures raised by the numeric core.
///
/// NaN flowing through arithmetic (a zero or NaN median, an all-NaN window)
/// is a value-level outcome and never shows up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported array shape: expected 1 or 2 dimensions, got {0}")]
    UnsupportedShape(usize),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("empty result: {0}")]
    EmptyResult(String),

    #[error("band {0} selects no wavelengths")]
    EmptyBand(String),
}
