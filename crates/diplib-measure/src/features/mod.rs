//! The features registered with every new [`crate::MeasurementTool`]

pub mod composite;
pub mod line_based;
pub mod shape;

pub use composite::ShapeFactor;
pub use line_based::{BoundingBoxFeature, Center, ExtremePosition, GreyFeature, Mu, Size};
pub use shape::{
    BendingEnergy, ConvexArea, ConvexPerimeter, EllipseVariance, Feret, Perimeter, Radius,
    SolidArea,
};

use crate::feature::Feature;

/// One instance of each built-in feature, in registration order.
pub fn default_features() -> Vec<Feature> {
    vec![
        Feature::LineBased(Box::new(Size::new())),
        Feature::LineBased(Box::new(BoundingBoxFeature::minimum())),
        Feature::LineBased(Box::new(BoundingBoxFeature::maximum())),
        Feature::LineBased(Box::new(BoundingBoxFeature::cartesian_box())),
        Feature::LineBased(Box::new(Center::new())),
        Feature::LineBased(Box::new(Mu::new())),
        Feature::LineBased(Box::new(GreyFeature::mass())),
        Feature::LineBased(Box::new(GreyFeature::mean())),
        Feature::LineBased(Box::new(GreyFeature::max_val())),
        Feature::LineBased(Box::new(GreyFeature::min_val())),
        Feature::LineBased(Box::new(ExtremePosition::max_pos())),
        Feature::LineBased(Box::new(ExtremePosition::min_pos())),
        Feature::ChainCodeBased(Box::new(Perimeter::new())),
        Feature::ChainCodeBased(Box::new(SolidArea::new())),
        Feature::ChainCodeBased(Box::new(BendingEnergy::new())),
        Feature::ConvexHullBased(Box::new(Feret::new())),
        Feature::ConvexHullBased(Box::new(ConvexArea::new())),
        Feature::ConvexHullBased(Box::new(ConvexPerimeter::new())),
        Feature::PolygonBased(Box::new(Radius::new())),
        Feature::PolygonBased(Box::new(EllipseVariance::new())),
        Feature::Composite(Box::new(ShapeFactor::aspect_ratio_feret())),
        Feature::Composite(Box::new(ShapeFactor::p2a())),
        Feature::Composite(Box::new(ShapeFactor::roundness())),
        Feature::Composite(Box::new(ShapeFactor::circularity())),
        Feature::Composite(Box::new(ShapeFactor::solidity())),
        Feature::Composite(Box::new(ShapeFactor::convexity())),
    ]
}
