//! Features of the object boundary
//!
//! Measured on the chain code, its polygon or the convex hull of that
//! polygon. All of these need a 2-D label image. Lengths are calibrated
//! only for isotropic pixels; with anisotropic pixels they stay in pixels.

use std::f64::consts::PI;

use diplib_core::{Error, Image, Units};
use diplib_region::{ChainCode, ConvexHull, Polygon};

use crate::error::MeasureResult;
use crate::feature::{
    ChainCodeBased, ConvexHullBased, FeatureBase, FeatureInformation, PolygonBased,
    ValueInformation, length_scale, unit_size_scale,
};

fn require_2d(label: &Image) -> MeasureResult<()> {
    match label.dimensionality() {
        2 => Ok(()),
        n => Err(Error::DimensionalityNotSupported(n).into()),
    }
}

/// Information and scale of a feature with a single calibrated value.
struct Scaled {
    info: FeatureInformation,
    scale: f64,
}

impl Scaled {
    fn new(name: &str, description: &str) -> Self {
        Scaled {
            info: FeatureInformation::new(name, description, false),
            scale: 1.0,
        }
    }

    /// Take `(scale, units)` and return the single value column.
    fn set(&mut self, (scale, units): (f64, Units)) -> Vec<ValueInformation> {
        self.scale = scale;
        vec![ValueInformation::new("", units)]
    }
}

// ---------------------------------------------------------------------------
// Chain-code based
// ---------------------------------------------------------------------------

/// Length of the object boundary. The chain code runs through pixel
/// centres, so half a pixel is missing all around; adding pi makes up for
/// it. A single pixel has a perimeter of pi.
pub struct Perimeter(Scaled);

impl Perimeter {
    pub fn new() -> Self {
        Perimeter(Scaled::new("Perimeter", "Length of the object perimeter"))
    }
}

impl Default for Perimeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Perimeter {
    fn information(&self) -> &FeatureInformation {
        &self.0.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        Ok(self.0.set(length_scale(label)))
    }
}

impl ChainCodeBased for Perimeter {
    fn measure(&mut self, chain_code: &ChainCode, output: &mut [f64]) -> MeasureResult<()> {
        let length = chain_code.length(true)?;
        let perimeter = if chain_code.codes.is_empty() {
            length
        } else {
            length + PI
        };
        output[0] = perimeter * self.0.scale;
        Ok(())
    }
}

/// Area of the object computed from its boundary, holes included.
pub struct SolidArea(Scaled);

impl SolidArea {
    pub fn new() -> Self {
        SolidArea(Scaled::new(
            "SolidArea",
            "Area of object with any holes filled",
        ))
    }
}

impl Default for SolidArea {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for SolidArea {
    fn information(&self) -> &FeatureInformation {
        &self.0.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        Ok(self.0.set(unit_size_scale(label)))
    }
}

impl ChainCodeBased for SolidArea {
    fn measure(&mut self, chain_code: &ChainCode, output: &mut [f64]) -> MeasureResult<()> {
        output[0] = chain_code.area()? * self.0.scale;
        Ok(())
    }
}

/// Integral of the squared boundary curvature. Curvature has units of
/// inverse length.
pub struct BendingEnergy(Scaled);

impl BendingEnergy {
    pub fn new() -> Self {
        BendingEnergy(Scaled::new(
            "BendingEnergy",
            "Bending energy of object perimeter",
        ))
    }
}

impl Default for BendingEnergy {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for BendingEnergy {
    fn information(&self) -> &FeatureInformation {
        &self.0.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        let (scale, units) = length_scale(label);
        Ok(self.0.set((1.0 / scale, units.power(-1))))
    }
}

impl ChainCodeBased for BendingEnergy {
    fn measure(&mut self, chain_code: &ChainCode, output: &mut [f64]) -> MeasureResult<()> {
        output[0] = chain_code.bending_energy() * self.0.scale;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Polygon based
// ---------------------------------------------------------------------------

/// Statistics of the distance from the centroid to the boundary polygon:
/// maximum, mean, minimum and standard deviation.
pub struct Radius {
    info: FeatureInformation,
    scale: f64,
}

impl Radius {
    pub fn new() -> Self {
        Radius {
            info: FeatureInformation::new(
                "Radius",
                "Statistics on radius of object",
                false,
            ),
            scale: 1.0,
        }
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Radius {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        let (scale, units) = length_scale(label);
        self.scale = scale;
        Ok(["Max", "Mean", "Min", "StdDev"]
            .into_iter()
            .map(|name| ValueInformation::new(name, units.clone()))
            .collect())
    }
}

impl PolygonBased for Radius {
    fn measure(&mut self, polygon: &Polygon, output: &mut [f64]) {
        let radius = polygon.radius_statistics(polygon.centroid());
        let values = [
            radius.maximum(),
            radius.mean(),
            radius.minimum(),
            radius.standard_deviation(),
        ];
        for (out, v) in output.iter_mut().zip(values) {
            *out = v * self.scale;
        }
    }
}

/// Coefficient of variation of the Mahalanobis distance from the centroid
/// to the polygon vertices. 0 for an ellipse.
pub struct EllipseVariance {
    info: FeatureInformation,
}

impl EllipseVariance {
    pub fn new() -> Self {
        EllipseVariance {
            info: FeatureInformation::new(
                "EllipseVariance",
                "Ellipse variance of object perimeter",
                false,
            ),
        }
    }
}

impl Default for EllipseVariance {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for EllipseVariance {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        Ok(vec![ValueInformation::new("", Units::dimensionless())])
    }
}

impl PolygonBased for EllipseVariance {
    fn measure(&mut self, polygon: &Polygon, output: &mut [f64]) {
        let g = polygon.centroid();
        let c = polygon.covariance_matrix_vertices(g);
        output[0] = polygon.ellipse_variance(g, &c);
    }
}

// ---------------------------------------------------------------------------
// Convex-hull based
// ---------------------------------------------------------------------------

/// Feret diameters of the convex hull: maximum, minimum, the diameter
/// perpendicular to the minimum, and the angles of the maximum and the
/// minimum.
pub struct Feret {
    info: FeatureInformation,
    scale: f64,
}

impl Feret {
    pub fn new() -> Self {
        Feret {
            info: FeatureInformation::new(
                "Feret",
                "Maximum and minimum object diameters",
                false,
            ),
            scale: 1.0,
        }
    }
}

impl Default for Feret {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Feret {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        let (scale, units) = length_scale(label);
        self.scale = scale;
        Ok(vec![
            ValueInformation::new("Max", units.clone()),
            ValueInformation::new("Min", units.clone()),
            ValueInformation::new("PerpMin", units),
            ValueInformation::new("MaxAng", Units::radian()),
            ValueInformation::new("MinAng", Units::radian()),
        ])
    }
}

impl ConvexHullBased for Feret {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]) {
        let feret = hull.feret();
        output[0] = feret.max_diameter * self.scale;
        output[1] = feret.min_diameter * self.scale;
        output[2] = feret.max_perpendicular * self.scale;
        output[3] = feret.max_angle;
        output[4] = feret.min_angle;
    }
}

/// Area of the convex hull.
pub struct ConvexArea(Scaled);

impl ConvexArea {
    pub fn new() -> Self {
        ConvexArea(Scaled::new("ConvexArea", "Area of the convex hull"))
    }
}

impl Default for ConvexArea {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for ConvexArea {
    fn information(&self) -> &FeatureInformation {
        &self.0.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        Ok(self.0.set(unit_size_scale(label)))
    }
}

impl ConvexHullBased for ConvexArea {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]) {
        output[0] = hull.area() * self.0.scale;
    }
}

/// Perimeter of the convex hull.
pub struct ConvexPerimeter(Scaled);

impl ConvexPerimeter {
    pub fn new() -> Self {
        ConvexPerimeter(Scaled::new(
            "ConvexPerimeter",
            "Perimeter of the convex hull",
        ))
    }
}

impl Default for ConvexPerimeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for ConvexPerimeter {
    fn information(&self) -> &FeatureInformation {
        &self.0.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(label)?;
        Ok(self.0.set(length_scale(label)))
    }
}

impl ConvexHullBased for ConvexPerimeter {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]) {
        output[0] = hull.perimeter() * self.0.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplib_core::{PhysicalQuantity, PixelSize};
    use diplib_region::VertexInteger;

    fn label_2d() -> Image {
        Image::from_vec(&[3, 3], vec![0u32; 9]).unwrap()
    }

    #[test]
    fn test_perimeter_of_single_pixel_and_square() {
        let mut perimeter = Perimeter::new();
        perimeter.initialize(&label_2d(), None, 1).unwrap();
        let mut out = [0.0];
        let pixel = ChainCode::from_directions(VertexInteger::new(1, 1), &[], true);
        perimeter.measure(&pixel, &mut out).unwrap();
        assert!((out[0] - PI).abs() < 1e-12);
        // 2 x 2 square: four even steps and four corners
        let square = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 6, 4, 2], true);
        perimeter.measure(&square, &mut out).unwrap();
        assert!((out[0] - (4.0 * 0.980 - 4.0 * 0.091 + PI)).abs() < 1e-12);
        perimeter.measure(&ChainCode::default(), &mut out).unwrap();
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_calibrated_units() {
        let mut label = label_2d();
        label.set_pixel_size(PixelSize::isotropic(PhysicalQuantity::new(0.5, Units::meter())));
        let mut area = SolidArea::new();
        let values = area.initialize(&label, None, 1).unwrap();
        assert_eq!(values[0].units, Units::meter().power(2));
        let square = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 6, 4, 2], true);
        let mut out = [0.0];
        area.measure(&square, &mut out).unwrap();
        assert_eq!(out[0], 4.0 * 0.25);

        let mut bending = BendingEnergy::new();
        let values = bending.initialize(&label, None, 1).unwrap();
        assert_eq!(values[0].units, Units::meter().power(-1));

        let mut feret = Feret::new();
        let values = feret.initialize(&label, None, 1).unwrap();
        assert_eq!(values.len(), 5);
        assert_eq!(values[4].units, Units::radian());
    }

    #[test]
    fn test_boundary_features_need_2d() {
        let label = Image::from_vec(&[2, 2, 2], vec![1u32; 8]).unwrap();
        assert!(Perimeter::new().initialize(&label, None, 1).is_err());
        assert!(ConvexArea::new().initialize(&label, None, 1).is_err());
    }
}
