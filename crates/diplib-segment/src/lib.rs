//! diplib-segment - Global threshold selection
//!
//! This crate picks intensity thresholds from 1-D histograms and applies
//! them to images:
//!
//! - **Histogram estimators** ([`histogram`]) - Isodata, Otsu, minimum
//!   error, triangle and background thresholds, pure functions of a
//!   [`Histogram`](diplib_core::Histogram)
//! - **Image wrappers** - the same estimators applied to the histogram of
//!   a scalar image within an optional mask, returning the threshold and
//!   the thresholded image
//!
//! # Examples
//!
//! ```
//! use diplib_core::Image;
//! use diplib_segment::{TriangleOptions, fixed_threshold, triangle_threshold};
//!
//! let mut data = vec![10u8; 90];
//! data.extend([40, 80, 120, 160, 200, 240, 250, 250, 250, 250]);
//! let img = Image::from_vec(&[100], data).unwrap();
//! let (t, bin) = triangle_threshold(&img, None, &TriangleOptions::default()).unwrap();
//! assert!(t > 10.0);
//! assert_eq!(bin.to_vec::<u8>().unwrap()[0], 0);
//! assert_eq!(fixed_threshold(&img, t).unwrap().to_vec::<u8>().unwrap()[99], 1);
//! ```

pub mod error;
pub mod histogram;
pub mod threshold;

// Re-export core types
pub use diplib_core;

// Re-export error types
pub use error::{SegmentError, SegmentResult};

pub use histogram::{BackgroundOptions, TriangleOptions};
pub use threshold::{
    background_threshold, fixed_threshold, isodata_threshold, minimum_error_threshold,
    multiple_thresholds, otsu_threshold, triangle_threshold,
};
