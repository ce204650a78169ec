//! Features derived from other features
//!
//! A composite feature names its dependencies; the tool measures those
//! first and hands the object's row to [`Composite::compose`]. Ratios with
//! a zero denominator are NaN.

use std::f64::consts::PI;

use diplib_core::{Error, Image, Units};

use crate::error::{MeasureError, MeasureResult};
use crate::feature::{
    Composite, FeatureBase, FeatureInformation, ValueInformation, reverse_size_scale,
};
use crate::measurement::ObjectRow;

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Value `index` of feature `name` in `row`.
fn dependency(row: &ObjectRow<'_>, name: &str, index: usize) -> MeasureResult<f64> {
    row.feature(name)
        .and_then(|values| values.get(index).copied())
        .ok_or_else(|| MeasureError::FeatureNotPresent(name.to_string()))
}

/// How a [`ShapeFactor`] combines its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Formula {
    AspectRatioFeret,
    P2A,
    Roundness,
    Circularity,
    Solidity,
    Convexity,
}

impl Formula {
    fn information(self) -> FeatureInformation {
        let (name, description) = match self {
            Formula::AspectRatioFeret => (
                "AspectRatioFeret",
                "Feret-based aspect ratio of the object",
            ),
            Formula::P2A => (
                "P2A",
                "Circularity of the object: perimeter squared over 4 pi times area",
            ),
            Formula::Roundness => (
                "Roundness",
                "Roundness of the object: 4 pi times area over perimeter squared",
            ),
            Formula::Circularity => (
                "Circularity",
                "Circularity of the object: radius deviation over mean radius",
            ),
            Formula::Solidity => ("Solidity", "Area fraction of convex hull covered by object"),
            Formula::Convexity => (
                "Convexity",
                "Ratio of perimeter of convex hull to perimeter of object",
            ),
        };
        FeatureInformation::new(name, description, false)
    }

    fn dependencies(self) -> &'static [&'static str] {
        match self {
            Formula::AspectRatioFeret => &["Feret"],
            Formula::P2A => &["Size", "Perimeter"],
            Formula::Roundness => &["SolidArea", "Perimeter"],
            Formula::Circularity => &["Radius"],
            Formula::Solidity => &["Size", "ConvexArea"],
            Formula::Convexity => &["Perimeter", "ConvexPerimeter"],
        }
    }
}

/// A dimensionless shape descriptor computed from other features.
pub struct ShapeFactor {
    info: FeatureInformation,
    formula: Formula,
    /// Brings calibrated areas back to pixels for anisotropic images
    area_scale: f64,
}

impl ShapeFactor {
    fn with_formula(formula: Formula) -> Self {
        ShapeFactor {
            info: formula.information(),
            formula,
            area_scale: 1.0,
        }
    }

    /// Ratio of the perpendicular Feret diameter to the minimum one.
    pub fn aspect_ratio_feret() -> Self {
        Self::with_formula(Formula::AspectRatioFeret)
    }

    /// `P² / (4 π A)`: 1 for a disk, larger for other shapes.
    pub fn p2a() -> Self {
        Self::with_formula(Formula::P2A)
    }

    /// `4 π A / P²`, the inverse of `P2A` on the solid area.
    pub fn roundness() -> Self {
        Self::with_formula(Formula::Roundness)
    }

    pub fn circularity() -> Self {
        Self::with_formula(Formula::Circularity)
    }

    pub fn solidity() -> Self {
        Self::with_formula(Formula::Solidity)
    }

    /// Never more than 1.
    pub fn convexity() -> Self {
        Self::with_formula(Formula::Convexity)
    }
}

impl FeatureBase for ShapeFactor {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        if label.dimensionality() != 2 {
            return Err(Error::DimensionalityNotSupported(label.dimensionality()).into());
        }
        self.area_scale = reverse_size_scale(label);
        Ok(vec![ValueInformation::new("", Units::dimensionless())])
    }
}

impl Composite for ShapeFactor {
    fn dependencies(&self) -> Vec<String> {
        self.formula
            .dependencies()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn compose(&mut self, row: &ObjectRow<'_>, output: &mut [f64]) -> MeasureResult<()> {
        output[0] = match self.formula {
            Formula::AspectRatioFeret => {
                ratio(dependency(row, "Feret", 2)?, dependency(row, "Feret", 1)?)
            }
            Formula::P2A => {
                let area = dependency(row, "Size", 0)? * self.area_scale;
                let perimeter = dependency(row, "Perimeter", 0)?;
                ratio(perimeter * perimeter, 4.0 * PI * area)
            }
            Formula::Roundness => {
                let area = dependency(row, "SolidArea", 0)? * self.area_scale;
                let perimeter = dependency(row, "Perimeter", 0)?;
                ratio(4.0 * PI * area, perimeter * perimeter)
            }
            Formula::Circularity => {
                ratio(dependency(row, "Radius", 3)?, dependency(row, "Radius", 1)?)
            }
            Formula::Solidity => {
                ratio(dependency(row, "Size", 0)?, dependency(row, "ConvexArea", 0)?)
            }
            Formula::Convexity => {
                let convex = dependency(row, "ConvexPerimeter", 0)?;
                ratio(convex, dependency(row, "Perimeter", 0)?).min(1.0)
            }
        };
        Ok(())
    }
}
