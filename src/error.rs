//! Error types for the state-space controller.
//!
//! This module provides a unified error type [`ControlError`] that covers
//! every failure the matrix engine, the controller and the data file codec
//! can report. All of them are local and synchronous: they are raised at the
//! offending call and nothing is retried.

use thiserror::Error;

/// Result type alias using [`ControlError`].
pub type Result<T> = std::result::Result<T, ControlError>;

/// Unified error type for all controller operations.
#[derive(Error, Debug)]
pub enum ControlError {
    // ============ Data File Errors ============
    /// The controller data file could not be opened or read
    #[error("Failed to open controller data file '{path}': {source}")]
    FileOpenError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The controller data file could not be written
    #[error("Failed to write controller data file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed numeric line or wrong line count
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    // ============ Algebra Errors ============
    /// Operand shapes are incompatible for an algebraic operation
    #[error("Shape mismatch in {operation}: {}x{} vs {}x{}", .lhs.0, .lhs.1, .rhs.0, .rhs.1)]
    ShapeMismatch {
        operation: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    // ============ Controller Errors ============
    /// A, B, C, D shapes are mutually inconsistent, or a signal has the wrong length
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// Time step is not a positive finite number
    #[error("Invalid time step {value}: must be positive and finite")]
    InvalidTimeStep { value: f64 },

    /// Saturation bounds do not fit the controller output
    #[error("Invalid saturation bounds: {message}")]
    InvalidBounds { message: String },

    // ============ Stream Errors ============
    /// Malformed cycle line on the input stream
    #[error("Input error at line {line}: {message}")]
    StreamInput { line: usize, message: String },

    /// Error writing to the output stream
    #[error("Output error: {message}")]
    StreamOutput { message: String },
}

impl ControlError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape(operation: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Self::ShapeMismatch { operation, lhs, rhs }
    }

    /// Create a dimension mismatch error
    pub fn dimension(message: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
        }
    }

    /// Create an invalid bounds error
    pub fn bounds(message: impl Into<String>) -> Self {
        Self::InvalidBounds {
            message: message.into(),
        }
    }
}
