//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// A test fixture could not be parsed
    #[error("invalid fixture at row {row}: {message}")]
    Fixture { row: usize, message: String },

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Image comparison failed
    #[error("image comparison failed at index {index}")]
    ImageMismatch { index: usize },

    /// An image operation failed while building or comparing fixtures
    #[error("image error: {0}")]
    Core(#[from] diplib_core::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
