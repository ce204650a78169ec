//! diplib-region - Connected components and object boundaries
//!
//! This crate provides the region analysis part of DIPlib:
//!
//! - **Labeling** - connected component labeling of binary images in any
//!   dimensionality, with size filtering and per-dimension boundary handling
//! - **Label manipulation** - listing object IDs, relabeling, removing small
//!   objects
//! - **Chain codes** - Freeman chain codes of 2-D object boundaries, with
//!   length, Feret, bending energy and other measurements
//! - **Polygons** - sub-pixel boundary polygons, convex hulls, moments and
//!   shape descriptors
//!
//! # Examples
//!
//! ## Labeling a binary image
//!
//! ```
//! use diplib_core::Image;
//! use diplib_region::{LabelOptions, label};
//!
//! let img = Image::from_vec(&[5, 2], vec![
//!     true, true, false, false, true,
//!     false, false, false, true, true,
//! ]).unwrap();
//! let (labels, n) = label(&img, &LabelOptions::default()).unwrap();
//! assert_eq!(n, 2);
//! assert_eq!(labels.to_vec::<u32>().unwrap(), vec![1, 1, 0, 0, 2, 0, 0, 0, 2, 2]);
//! ```
//!
//! ## From labels to shape
//!
//! ```
//! use diplib_core::Image;
//! use diplib_region::get_image_chain_codes;
//!
//! let img = Image::from_vec(&[5, 5], vec![
//!     0u8, 0, 0, 0, 0,
//!     0, 1, 1, 1, 0,
//!     0, 1, 1, 1, 0,
//!     0, 1, 1, 1, 0,
//!     0, 0, 0, 0, 0,
//! ]).unwrap();
//! let cc = get_image_chain_codes(&img, &[1], 2).unwrap().remove(0);
//! assert_eq!(cc.area().unwrap(), 9.0);
//! let polygon = cc.polygon().unwrap();
//! let hull = polygon.convex_hull().unwrap();
//! assert!(hull.area() >= polygon.area());
//! ```

pub mod chain_code;
pub mod contour;
pub mod convex_hull;
pub mod error;
pub mod label;
pub mod label_manipulation;
pub mod polygon;
pub mod union_find;
pub mod vertex;

// Re-export core types
pub use diplib_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

// Labeling
pub use label::{LabelOptions, label};
pub use label_manipulation::{Background, get_object_labels, relabel, small_objects_remove};
pub use union_find::{LabelMap, LabelType, UnionFind};

// Chain codes
pub use chain_code::{BorderCodes, ChainCode, Code, DELTAS4, DELTAS8};
pub use contour::{get_image_chain_codes, get_single_chain_code};

// Polygons
pub use convex_hull::ConvexHull;
pub use polygon::{
    CircleParameters, CovarianceMatrix, EllipseParameters, Eigenvalues, FeretValues, Polygon,
    RadiusValues,
};
pub use vertex::{
    BoundingBox, BoundingBoxFloat, BoundingBoxInteger, Vertex, VertexFloat, VertexInteger,
};
