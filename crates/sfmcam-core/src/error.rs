//! Error types for sfmcam.

use thiserror::Error;

use crate::axis::Axis;

/// Errors raised while reading an SfM document.
///
/// Any of these aborts the import before the scene is touched.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input is not valid JSON.
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A required field is absent or not numeric.
    #[error("missing or non-numeric field '{0}'")]
    MissingField(String),

    /// A field is present and numeric but outside its domain.
    #[error("invalid value at '{path}': {reason}")]
    InvalidValue {
        /// Location of the field in the document.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A malformed field inside one document entry.
///
/// Kept apart from [`ParseError`] so it can be stored on a [`Document`] and
/// raised later, when the entry is actually used.
///
/// [`Document`]: crate::document::Document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing or non-numeric field '{0}'")]
    Missing(String),

    #[error("invalid value at '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

impl From<FieldError> for ParseError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Missing(path) => ParseError::MissingField(path),
            FieldError::Invalid { path, reason } => ParseError::InvalidValue { path, reason },
        }
    }
}

/// The main error type for sfmcam operations.
#[derive(Error, Debug)]
pub enum SfmError {
    /// The SfM document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Forward and up axes lie on the same line.
    #[error("forward axis {forward} and up axis {up} must be perpendicular")]
    InvalidAxes { forward: Axis, up: Axis },

    /// The sensor width used for lens values is not a positive number.
    #[error("sensor width must be positive and finite, found {0}")]
    InvalidSensorWidth(f64),

    /// Samples handed to the emitter are not strictly increasing in frame.
    #[error("samples out of order: frame {next} follows frame {previous}")]
    UnorderedSamples { previous: u64, next: u64 },

    /// The host scene rejected an operation.
    #[error("scene error: {0}")]
    SceneError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error outside of document parsing (options, exports).
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for sfmcam operations.
pub type Result<T> = std::result::Result<T, SfmError>;
