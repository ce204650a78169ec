//! DIPlib - Quantitative image analysis for Rust
//!
//! This is a Rust port of the core of [DIPlib](https://diplib.org/), a
//! library for quantitative image analysis.
//!
//! # Overview
//!
//! - An n-dimensional image container with tensor pixels, strided views
//!   and physical pixel sizes
//! - Connected component labeling, chain codes, polygons and convex hulls
//! - Object measurement with a registry of size, shape and intensity
//!   features
//! - Global threshold selection from histograms
//!
//! # Example
//!
//! ```
//! use diplib::measure::{MeasureOptions, MeasurementTool};
//! use diplib::region::{LabelOptions, label};
//! use diplib::segment::otsu_threshold;
//! use diplib::Image;
//!
//! let img = Image::from_vec(&[6, 3], vec![
//!     10u8, 200, 210, 12, 11, 205,
//!     11, 190, 220, 10, 12, 215,
//!     12, 10, 11, 13, 10, 12,
//! ]).unwrap();
//! let (_, bin) = otsu_threshold(&img, None).unwrap();
//! let (labels, n) = label(&bin, &LabelOptions::default()).unwrap();
//! assert_eq!(n, 2);
//!
//! let mut tool = MeasurementTool::new();
//! let msr = tool
//!     .measure(&labels, Some(&img), &["Size", "Mean"], &[], &MeasureOptions::default())
//!     .unwrap();
//! assert_eq!(msr[("Size", 1)], [4.0]);
//! assert_eq!(msr[("Size", 2)], [2.0]);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use diplib_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use diplib_measure as measure;
pub use diplib_region as region;
pub use diplib_segment as segment;
