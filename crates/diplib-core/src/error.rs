//! Error types for diplib-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Variants follow the error taxonomy of the library: invalid input
//! (shape, type, flag and parameter problems), operations on raw images,
//! and runtime failures of numerical estimators.
//!
//! Errors can be annotated with the functions they passed through on the
//! way out, see [`ErrorTrace`].

use std::panic::Location;

use thiserror::Error;

use crate::DataType;

/// diplib-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The operation needs pixel data, but the image is raw
    #[error("image is not forged")]
    ImageNotForged,

    /// The image is forged but the operation needs a raw image
    #[error("image is forged")]
    ImageNotRaw,

    /// The operation requires one sample per pixel
    #[error("image is not scalar")]
    ImageNotScalar,

    /// The operation requires a binary image
    #[error("image is not binary")]
    ImageNotBinary,

    /// Data type not supported by this operation
    #[error("data type not supported: {0}")]
    DataTypeNotSupported(DataType),

    /// A specific data type was expected
    #[error("wrong data type: expected {expected}, got {actual}")]
    WrongDataType { expected: DataType, actual: DataType },

    /// Two images (or an image and an array) differ in dimensionality
    #[error("dimensionalities don't match: {0} vs {1}")]
    DimensionalitiesDontMatch(usize, usize),

    /// The operation does not support this number of dimensions
    #[error("dimensionality not supported: {0}")]
    DimensionalityNotSupported(usize),

    /// Image sizes differ and cannot be singleton-expanded
    #[error("sizes don't match: {0} vs {1}")]
    SizesDontMatch(String, String),

    /// Numbers of tensor elements differ
    #[error("number of tensor elements doesn't match: {0} vs {1}")]
    NTensorElemDontMatch(usize, usize),

    /// Index or coordinate outside of the valid range
    #[error("index out of range: {index} (size {len})")]
    IndexOutOfRange { index: isize, len: usize },

    /// Array argument with the wrong number of elements
    #[error("array parameter has wrong length: expected {expected}, got {actual}")]
    ArrayParameterWrongLength { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unrecognized option string
    #[error("invalid flag: {0}")]
    InvalidFlag(String),

    /// Operation not supported
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// A numerical procedure could not produce a result
    #[error("{0}")]
    Runtime(String),

    /// Memory allocation failed
    #[error("memory allocation failed")]
    AllocationFailed,

    /// An error annotated with the function it passed through
    #[error("{source}\nin function: {function} ({file} at line {line})")]
    Traced {
        function: &'static str,
        file: &'static str,
        line: u32,
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for [`Error::SizesDontMatch`] from two size arrays.
    pub fn sizes_dont_match(lhs: &[usize], rhs: &[usize]) -> Self {
        Error::SizesDontMatch(format!("{lhs:?}"), format!("{rhs:?}"))
    }

    /// The innermost error, with all trace frames removed.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Traced { source, .. } = err {
            err = source;
        }
        err
    }

    /// Names of the functions this error was annotated with, innermost first.
    pub fn trace_frames(&self) -> Vec<&'static str> {
        let mut frames = Vec::new();
        let mut err = self;
        while let Error::Traced {
            function, source, ..
        } = err
        {
            frames.push(*function);
            err = source;
        }
        frames.reverse();
        frames
    }
}

/// Result type alias for diplib-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adds a call-site frame to an error as it propagates.
///
/// # Examples
///
/// ```
/// use diplib_core::{Error, ErrorTrace, Result};
///
/// fn inner() -> Result<()> {
///     Err(Error::ImageNotForged)
/// }
///
/// let err = inner().trace("outer").unwrap_err();
/// assert!(matches!(err.root(), Error::ImageNotForged));
/// assert_eq!(err.trace_frames(), vec!["outer"]);
/// ```
pub trait ErrorTrace<T> {
    /// Wrap the error, if any, with the name of `function` and the caller's
    /// file and line.
    fn trace(self, function: &'static str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorTrace<T> for std::result::Result<T, E> {
    #[track_caller]
    fn trace(self, function: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let location = Location::caller();
                Err(Error::Traced {
                    function,
                    file: location.file(),
                    line: location.line(),
                    source: Box::new(e.into()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> Result<u32> {
        Err(Error::InvalidFlag("foo".to_string()))
    }

    #[test]
    fn test_trace_stacks_frames() {
        let err = failing().trace("first").trace("second").unwrap_err();
        assert_eq!(err.trace_frames(), vec!["first", "second"]);
        assert!(matches!(err.root(), Error::InvalidFlag(f) if f == "foo"));
        let text = err.to_string();
        assert!(text.starts_with("invalid flag: foo"));
        assert!(text.contains("in function: first"));
        assert!(text.contains("in function: second"));
    }

    #[test]
    fn test_trace_passes_ok_through() {
        let v: Result<u32> = Ok(3);
        assert_eq!(v.trace("anything").unwrap(), 3);
    }
}
