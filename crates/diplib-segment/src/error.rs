//! Error types for diplib-segment

use thiserror::Error;

/// Errors that can occur during threshold selection
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] diplib_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The histogram has too few bins or too little spread to split
    #[error("degenerate histogram: {0}")]
    DegenerateHistogram(String),
}

/// Result type for threshold selection
pub type SegmentResult<T> = Result<T, SegmentError>;
