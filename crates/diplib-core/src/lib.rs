//! DIPlib Core - Image container and basic data structures
//!
//! This crate provides the fundamental data structures used throughout the
//! DIPlib quantitative image analysis library:
//!
//! - [`Image`] - multi-dimensional, tensor-valued, strided pixel container
//!   with shared storage and non-copying views
//! - [`View`] / [`Range`] / [`PixelRef`] - regular and irregular pixel
//!   selections
//! - [`Sample`] / [`Pixel`] - typed sample and tensor pixel values
//! - [`DataType`] - the closed set of sample types and their promotion rules
//! - [`Tensor`] - per-pixel tensor shape
//! - [`DimensionArray`] - short inline array for sizes, strides, coordinates
//! - [`PixelSize`] / [`PhysicalQuantity`] / [`Units`] - physical calibration
//! - [`Histogram`] - bounded multi-dimensional count image
//! - [`BoundaryCondition`] - edge handling flags
//!
//! # Examples
//!
//! ```
//! use diplib_core::{ArithOp, DataType, Image};
//!
//! let a = Image::from_vec(&[3], vec![100u8, 200, 250]).unwrap();
//! let b = Image::from_vec(&[1], vec![10u8]).unwrap();
//! // singleton expansion, saturated on the output type
//! let sum = a.arith(&b, ArithOp::Add, Some(DataType::UInt8)).unwrap();
//! assert_eq!(sum.to_vec::<u8>().unwrap(), vec![110, 210, 255]);
//! ```

pub mod boundary;
pub mod datatype;
pub mod dimension_array;
pub mod error;
pub mod histogram;
pub mod image;
pub mod physical;
pub mod sample;
pub mod tensor;

pub use boundary::BoundaryCondition;
pub use datatype::{DT_LABEL, DataType, SampleType};
pub use dimension_array::{
    BooleanArray, DimensionArray, FloatArray, INLINE_CAPACITY, IntegerArray, UnsignedArray,
};
pub use error::{Error, ErrorTrace, Result};
pub use histogram::{Histogram, HistogramConfiguration};
pub use image::{
    ArithOp, CompareOp, CropLocation, Image, ImageIterator, IndexedImageIterator, PixelRef, Range,
    SampleBuffer, View, singleton_expanded_sizes,
};
pub use physical::{PhysicalQuantity, PixelSize, Units};
pub use sample::{Pixel, Sample};
pub use tensor::{Tensor, TensorShape};
