//! diplib-measure - Quantifying objects in label images
//!
//! This crate measures features of the objects in a label image:
//!
//! - **Measurement tool** - a registry of named features and the
//!   [`MeasurementTool::measure`] driver that runs them
//! - **Features** - size, position, moments and grey-value statistics
//!   accumulated line by line in any dimensionality; perimeter, Feret
//!   diameters, radius and convexity measures on 2-D object boundaries;
//!   shape factors composed from other features
//! - **Measurement** - the resulting table of objects by feature values,
//!   with merging, printing and column statistics
//!
//! Values are scaled by the pixel size of the label image and carry its
//! units.
//!
//! # Examples
//!
//! ```
//! use diplib_core::Image;
//! use diplib_measure::{MeasureOptions, MeasurementTool, statistics};
//!
//! let label = Image::from_vec(&[6, 4], vec![
//!     1u8, 1, 1, 0, 0, 0,
//!     1, 1, 1, 0, 2, 0,
//!     1, 1, 1, 0, 0, 0,
//!     0, 0, 0, 0, 0, 0,
//! ]).unwrap();
//! let mut tool = MeasurementTool::new();
//! let msr = tool
//!     .measure(&label, None, &["Size", "SolidArea", "Perimeter"], &[], &MeasureOptions::default())
//!     .unwrap();
//! assert_eq!(msr[("Size", 1)], [9.0]);
//! assert_eq!(msr[("SolidArea", 1)], [9.0]);
//! // a single pixel has a perimeter of pi
//! assert!((msr[("Perimeter", 2)][0] - std::f64::consts::PI).abs() < 1e-12);
//!
//! let size = msr.feature("Size").unwrap();
//! assert_eq!(statistics::object_maximum(&size).unwrap(), 1);
//! println!("{msr}");
//! ```

pub mod error;
pub mod feature;
pub mod features;
pub mod measurement;
pub mod statistics;
pub mod tool;

// Re-export core types
pub use diplib_core;

// Re-export error types
pub use error::{MeasureError, MeasureResult};

pub use feature::{
    ChainCodeBased, Composite, ConvexHullBased, Feature, FeatureBase, FeatureInformation,
    FeatureKind, LineBased, LineScan, ObjectIdToIndexMap, PolygonBased, ValueInformation,
};
pub use measurement::{FeatureColumn, FeatureLayout, Measurement, ObjectRow};
pub use statistics::object_to_measurement;
pub use tool::{MeasureOptions, MeasurementTool};
