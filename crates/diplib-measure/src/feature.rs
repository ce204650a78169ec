//! Measurement features
//!
//! A feature computes a fixed number of values for every object in a label
//! image. How it gets at the object depends on its kind:
//!
//! - [`LineBased`] features see the image one line at a time and keep
//!   per-object accumulators
//! - [`ChainCodeBased`], [`PolygonBased`] and [`ConvexHullBased`] features
//!   see the boundary of one 2-D object at a time
//! - [`Composite`] features combine the values of other features
//!
//! Every feature also implements [`FeatureBase`], which declares its name and
//! the layout of its values. [`Feature`] wraps a boxed feature of any kind so
//! the [`crate::MeasurementTool`] can keep them in one registry.

use std::collections::HashMap;

use diplib_core::{Image, Units};
use diplib_region::{ChainCode, ConvexHull, LabelType, Polygon};

use crate::error::MeasureResult;
use crate::measurement::ObjectRow;

/// Maps object IDs to row indices of the measurement being filled.
pub type ObjectIdToIndexMap = HashMap<LabelType, usize>;

/// Name and units of one value column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueInformation {
    pub name: String,
    pub units: Units,
}

impl ValueInformation {
    pub fn new(name: impl Into<String>, units: Units) -> Self {
        ValueInformation {
            name: name.into(),
            units,
        }
    }
}

/// Static description of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInformation {
    pub name: String,
    pub description: String,
    /// The feature reads the grey-value image
    pub needs_grey: bool,
}

impl FeatureInformation {
    pub fn new(name: &str, description: &str, needs_grey: bool) -> Self {
        FeatureInformation {
            name: name.to_string(),
            description: description.to_string(),
            needs_grey,
        }
    }
}

/// How a feature gets at the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    LineBased,
    ChainCodeBased,
    PolygonBased,
    ConvexHullBased,
    Composite,
}

/// Behavior shared by all features.
pub trait FeatureBase: Send {
    fn information(&self) -> &FeatureInformation;

    /// Prepare for measuring `n_objects` objects and return the layout of
    /// the values. Called once per measurement, before any data is seen.
    fn initialize(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>>;

    /// Release the state built up since [`FeatureBase::initialize`].
    fn cleanup(&mut self) {}
}

/// One image line handed to [`LineBased::scan_line`].
pub struct LineScan<'a> {
    /// Labels along the line
    pub label: &'a [LabelType],
    /// Grey values along the line, if a grey image was given
    pub grey: Option<&'a [f64]>,
    /// Coordinates of the first pixel of the line
    pub coordinates: &'a [usize],
    /// The dimension along which the line runs
    pub dimension: usize,
    pub object_indices: &'a ObjectIdToIndexMap,
}

impl LineScan<'_> {
    /// Call `f(object_index, position)` for every pixel on the line that
    /// belongs to a measured object. Pixels of objects not in the
    /// measurement are skipped.
    pub fn for_each_object_pixel(&self, mut f: impl FnMut(usize, usize)) {
        let mut current: LabelType = 0;
        let mut index = None;
        for (pos, &id) in self.label.iter().enumerate() {
            if id == 0 {
                continue;
            }
            if id != current {
                current = id;
                index = self.object_indices.get(&id).copied();
            }
            if let Some(index) = index {
                f(index, pos);
            }
        }
    }

    /// Coordinate along dimension `d` of the pixel at `pos` on this line.
    pub fn coordinate(&self, d: usize, pos: usize) -> usize {
        if d == self.dimension {
            self.coordinates[d] + pos
        } else {
            self.coordinates[d]
        }
    }
}

/// Features that accumulate data while the label image is scanned line by
/// line.
pub trait LineBased: FeatureBase {
    fn scan_line(&mut self, line: &LineScan<'_>);

    /// Write the values of the object at row `object_index`.
    fn finish(&mut self, object_index: usize, output: &mut [f64]);
}

/// Features measured on the chain code of each object.
pub trait ChainCodeBased: FeatureBase {
    fn measure(&mut self, chain_code: &ChainCode, output: &mut [f64]) -> MeasureResult<()>;
}

/// Features measured on the boundary polygon of each object.
pub trait PolygonBased: FeatureBase {
    fn measure(&mut self, polygon: &Polygon, output: &mut [f64]);
}

/// Features measured on the convex hull of each object.
pub trait ConvexHullBased: FeatureBase {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]);
}

/// Features computed from the values of other features.
pub trait Composite: FeatureBase {
    /// Names of the features this one reads. They are added to the
    /// measurement when not requested explicitly.
    fn dependencies(&self) -> Vec<String>;

    fn compose(&mut self, dependencies: &ObjectRow<'_>, output: &mut [f64]) -> MeasureResult<()>;
}

/// A registered feature of any kind.
pub enum Feature {
    LineBased(Box<dyn LineBased>),
    ChainCodeBased(Box<dyn ChainCodeBased>),
    PolygonBased(Box<dyn PolygonBased>),
    ConvexHullBased(Box<dyn ConvexHullBased>),
    Composite(Box<dyn Composite>),
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::LineBased(_) => FeatureKind::LineBased,
            Feature::ChainCodeBased(_) => FeatureKind::ChainCodeBased,
            Feature::PolygonBased(_) => FeatureKind::PolygonBased,
            Feature::ConvexHullBased(_) => FeatureKind::ConvexHullBased,
            Feature::Composite(_) => FeatureKind::Composite,
        }
    }

    pub fn information(&self) -> &FeatureInformation {
        match self {
            Feature::LineBased(f) => f.information(),
            Feature::ChainCodeBased(f) => f.information(),
            Feature::PolygonBased(f) => f.information(),
            Feature::ConvexHullBased(f) => f.information(),
            Feature::Composite(f) => f.information(),
        }
    }

    pub fn name(&self) -> &str {
        &self.information().name
    }

    pub(crate) fn initialize(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        match self {
            Feature::LineBased(f) => f.initialize(label, grey, n_objects),
            Feature::ChainCodeBased(f) => f.initialize(label, grey, n_objects),
            Feature::PolygonBased(f) => f.initialize(label, grey, n_objects),
            Feature::ConvexHullBased(f) => f.initialize(label, grey, n_objects),
            Feature::Composite(f) => f.initialize(label, grey, n_objects),
        }
    }

    pub(crate) fn cleanup(&mut self) {
        match self {
            Feature::LineBased(f) => f.cleanup(),
            Feature::ChainCodeBased(f) => f.cleanup(),
            Feature::PolygonBased(f) => f.cleanup(),
            Feature::ConvexHullBased(f) => f.cleanup(),
            Feature::Composite(f) => f.cleanup(),
        }
    }

    /// Dependencies of a composite feature; empty for other kinds.
    pub fn dependencies(&self) -> Vec<String> {
        match self {
            Feature::Composite(f) => f.dependencies(),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Debug for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feature")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Scaling of values by the pixel size of the label image
// ---------------------------------------------------------------------------

/// Scale and units for coordinates along dimension `d`. Uncalibrated
/// dimensions give pixels.
pub(crate) fn dimension_scale(label: &Image, d: usize) -> (f64, Units) {
    let q = label.pixel_size().get(d);
    if q.is_physical() {
        (q.magnitude, q.units)
    } else {
        (1.0, Units::pixel())
    }
}

/// Whether all dimensions of `label` have the same pixel size.
pub(crate) fn is_isotropic(label: &Image) -> bool {
    let ps = label.pixel_size();
    let first = ps.get(0);
    (1..label.dimensionality()).all(|d| ps.get(d) == first)
}

/// Scale and units for lengths measured along object boundaries. These
/// are only calibrated for isotropic pixels.
pub(crate) fn length_scale(label: &Image) -> (f64, Units) {
    if is_isotropic(label) {
        dimension_scale(label, 0)
    } else {
        (1.0, Units::pixel())
    }
}

/// Scale and units of the area (volume) of one pixel.
pub(crate) fn unit_size_scale(label: &Image) -> (f64, Units) {
    let n = label.dimensionality();
    let q = label.pixel_size().unit_size(n);
    if q.is_physical() {
        (q.magnitude, q.units)
    } else {
        (1.0, Units::pixel().power(n as i32))
    }
}

/// Factor that brings a calibrated area back to pixels when the pixels are
/// anisotropic, so it can be combined with boundary lengths (which are in
/// pixels in that case).
pub(crate) fn reverse_size_scale(label: &Image) -> f64 {
    let q = label.pixel_size().unit_size(label.dimensionality());
    if q.is_physical() && !is_isotropic(label) && q.magnitude != 0.0 {
        1.0 / q.magnitude
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplib_core::{PhysicalQuantity, PixelSize};

    #[test]
    fn test_for_each_object_pixel_skips_unknown_objects() {
        let indices: ObjectIdToIndexMap = [(3, 0), (5, 1)].into_iter().collect();
        let label = [0, 3, 3, 4, 5, 0, 3];
        let scan = LineScan {
            label: &label,
            grey: None,
            coordinates: &[10, 2],
            dimension: 0,
            object_indices: &indices,
        };
        let mut seen = Vec::new();
        scan.for_each_object_pixel(|index, pos| seen.push((index, scan.coordinate(0, pos))));
        assert_eq!(seen, vec![(0, 11), (0, 12), (1, 14), (0, 16)]);
        assert_eq!(scan.coordinate(1, 4), 2);
    }

    #[test]
    fn test_scales_follow_pixel_size() {
        let mut img = Image::from_vec(&[2, 2], vec![0u8; 4]).unwrap();
        assert_eq!(length_scale(&img), (1.0, Units::pixel()));
        assert_eq!(unit_size_scale(&img), (1.0, Units::pixel().power(2)));
        assert_eq!(reverse_size_scale(&img), 1.0);

        img.set_pixel_size(PixelSize::isotropic(PhysicalQuantity::new(2.0, Units::meter())));
        assert_eq!(length_scale(&img), (2.0, Units::meter()));
        assert_eq!(unit_size_scale(&img), (4.0, Units::meter().power(2)));
        assert_eq!(reverse_size_scale(&img), 1.0);

        img.set_pixel_size(PixelSize::from_quantities(vec![
            PhysicalQuantity::new(2.0, Units::meter()),
            PhysicalQuantity::new(0.5, Units::meter()),
        ]));
        assert_eq!(length_scale(&img), (1.0, Units::pixel()));
        assert_eq!(unit_size_scale(&img).0, 1.0);
        assert_eq!(dimension_scale(&img, 1), (0.5, Units::meter()));
        assert_eq!(reverse_size_scale(&img), 1.0);

        img.set_pixel_size(PixelSize::from_quantities(vec![
            PhysicalQuantity::new(2.0, Units::meter()),
            PhysicalQuantity::new(4.0, Units::meter()),
        ]));
        assert_eq!(reverse_size_scale(&img), 1.0 / 8.0);
    }
}
