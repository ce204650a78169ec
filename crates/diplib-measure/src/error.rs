//! Error types for diplib-measure

use thiserror::Error;

/// Errors that can occur while measuring objects or reading measurements
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] diplib_core::Error),

    /// Region analysis error, from chain code extraction or polygon handling
    #[error("region error: {0}")]
    Region(#[from] diplib_region::RegionError),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A feature with this name is already registered or present
    #[error("feature already exists: {0}")]
    FeatureExists(String),

    /// The measurement has no feature with this name
    #[error("feature not present: {0}")]
    FeatureNotPresent(String),

    /// The measurement has no object with this ID
    #[error("object not present: {0}")]
    ObjectNotPresent(usize),

    /// Objects and features can no longer be added
    #[error("measurement is already forged")]
    Forged,

    /// The measurement has no data yet
    #[error("measurement is not forged")]
    NotForged,

    /// Two measurements disagree on the number of values of a feature
    #[error("number of values for feature {0} doesn't match")]
    ValueCountMismatch(String),

    /// A statistic that needs at least one object
    #[error("no objects in feature column")]
    NoObjects,
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;
