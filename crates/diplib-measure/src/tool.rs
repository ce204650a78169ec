//! The measurement tool
//!
//! [`MeasurementTool`] keeps a registry of features by name and measures a
//! selection of them on the objects of a label image.
//!
//! A call to [`MeasurementTool::measure`] goes through these steps:
//!
//! 1. Check the images and list the objects (all non-zero labels unless
//!    given).
//! 2. Resolve the feature names, adding the dependencies of composite
//!    features.
//! 3. Initialize every feature, which fixes the table layout, and forge
//!    the [`Measurement`].
//! 4. Scan the label image line by line for the line-based features.
//! 5. Extract the chain code of every object for the boundary features,
//!    with its polygon and convex hull when needed.
//! 6. Compose the composite features.
//!
//! Features are cleaned up after the call, whether it succeeded or not.

use std::collections::HashMap;

use diplib_core::{Error, Image};
use diplib_region::{Background, ConvexHull, LabelType, get_image_chain_codes, get_object_labels};
use log::{debug, warn};

use crate::error::{MeasureError, MeasureResult};
use crate::feature::{Feature, FeatureInformation, FeatureKind, LineScan, ObjectIdToIndexMap};
use crate::features::default_features;
use crate::measurement::Measurement;

/// Options for [`MeasurementTool::measure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureOptions {
    /// Connectivity used to trace object boundaries: 1 or 2 (2-D)
    pub connectivity: usize,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self { connectivity: 2 }
    }
}

impl MeasureOptions {
    pub fn with_connectivity(mut self, connectivity: usize) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// A registry of measurement features.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_measure::{MeasureOptions, MeasurementTool};
///
/// let label = Image::from_vec(&[5, 3], vec![
///     1u8, 1, 0, 2, 2,
///     1, 1, 0, 2, 2,
///     0, 0, 0, 2, 2,
/// ]).unwrap();
/// let mut tool = MeasurementTool::new();
/// let msr = tool
///     .measure(&label, None, &["Size", "Center"], &[], &MeasureOptions::default())
///     .unwrap();
/// assert_eq!(msr.objects(), &[1, 2]);
/// assert_eq!(msr[("Size", 2)], [6.0]);
/// assert_eq!(msr[("Center", 1)], [0.5, 0.5]);
/// ```
#[derive(Debug)]
pub struct MeasurementTool {
    features: Vec<Feature>,
    indices: HashMap<String, usize>,
}

impl Default for MeasurementTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementTool {
    /// A tool with all built-in features registered.
    pub fn new() -> Self {
        let mut tool = MeasurementTool {
            features: Vec::new(),
            indices: HashMap::new(),
        };
        for feature in default_features() {
            tool.insert(feature);
        }
        tool
    }

    fn insert(&mut self, feature: Feature) {
        self.indices.insert(feature.name().to_string(), self.features.len());
        self.features.push(feature);
    }

    /// Add a feature to the registry.
    ///
    /// # Errors
    ///
    /// [`MeasureError::FeatureExists`] if a feature with that name is
    /// already registered.
    pub fn register(&mut self, feature: Feature) -> MeasureResult<()> {
        if self.exists(feature.name()) {
            return Err(MeasureError::FeatureExists(feature.name().to_string()));
        }
        self.insert(feature);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Information on the registered features, in registration order.
    pub fn features(&self) -> Vec<&FeatureInformation> {
        self.features.iter().map(|f| f.information()).collect()
    }

    /// Measure `features` on the objects of `label`.
    ///
    /// `label` is a scalar unsigned integer image. `grey`, required by
    /// intensity features, is a real-valued image of the same sizes.
    /// `object_ids` selects the objects; when empty, all non-zero labels in
    /// the image are measured. Requested objects that are not in the image
    /// get zeros for line-based features.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFlag`] for an unknown feature name
    /// - [`Error::InvalidParameter`] when a feature needs `grey` and none
    ///   is given
    /// - [`Error::SizesDontMatch`] when `grey` and `label` differ in size
    /// - [`MeasureError::InvalidParameters`] when no features are requested
    /// - errors of the features themselves, e.g. boundary features on a
    ///   label image that is not 2-D
    pub fn measure(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        features: &[&str],
        object_ids: &[usize],
        options: &MeasureOptions,
    ) -> MeasureResult<Measurement> {
        check_images(label, grey)?;
        let object_ids = if object_ids.is_empty() {
            get_object_labels(label, None, Background::Exclude)?
        } else {
            object_ids.to_vec()
        };
        if features.is_empty() {
            return Err(MeasureError::InvalidParameters(
                "no features requested".to_string(),
            ));
        }
        let selected = self.resolve(features, grey.is_some())?;

        let result = self.measure_selected(label, grey, &selected, object_ids, options);
        for &index in &selected {
            self.features[index].cleanup();
        }
        result
    }

    /// Registry indices of the requested features and their dependencies,
    /// without repeats, in request order with dependencies appended.
    fn resolve(&self, names: &[&str], has_grey: bool) -> MeasureResult<Vec<usize>> {
        let mut selected: Vec<usize> = Vec::with_capacity(names.len());
        let add = |name: &str, selected: &mut Vec<usize>| -> MeasureResult<()> {
            let index = *self
                .indices
                .get(name)
                .ok_or_else(|| Error::InvalidFlag(format!("feature {} does not exist", name)))?;
            if !selected.contains(&index) {
                selected.push(index);
            }
            Ok(())
        };
        for &name in names {
            add(name, &mut selected)?;
        }
        let mut ii = 0;
        while ii < selected.len() {
            for dependency in self.features[selected[ii]].dependencies() {
                add(dependency.as_str(), &mut selected)?;
            }
            ii += 1;
        }
        if !has_grey {
            if let Some(&index) = selected
                .iter()
                .find(|&&index| self.features[index].information().needs_grey)
            {
                return Err(Error::InvalidParameter(format!(
                    "feature {} requires a grey-value image",
                    self.features[index].name()
                ))
                .into());
            }
        }
        Ok(selected)
    }

    fn measure_selected(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        selected: &[usize],
        object_ids: Vec<usize>,
        options: &MeasureOptions,
    ) -> MeasureResult<Measurement> {
        let n_objects = object_ids.len();
        let mut msr = Measurement::new();
        msr.set_object_ids(object_ids)?;
        for &index in selected {
            let feature = &mut self.features[index];
            let values = feature.initialize(label, grey, n_objects)?;
            msr.add_feature(feature.name(), values)?;
        }
        msr.forge();
        if n_objects == 0 {
            debug!("measure: no objects to measure");
            return Ok(msr);
        }

        let mut object_indices = ObjectIdToIndexMap::with_capacity(n_objects);
        let mut labels = Vec::with_capacity(n_objects);
        for (row, &id) in msr.objects().iter().enumerate() {
            let id = LabelType::try_from(id).map_err(|_| {
                MeasureError::InvalidParameters(format!("object ID {} out of range", id))
            })?;
            object_indices.insert(id, row);
            labels.push(id);
        }

        let kinds: Vec<FeatureKind> = selected.iter().map(|&i| self.features[i].kind()).collect();
        if kinds.contains(&FeatureKind::LineBased) {
            self.scan_lines(label, grey, selected, &object_indices, &mut msr)?;
        }
        let needs_boundary = kinds.iter().any(|k| {
            matches!(
                k,
                FeatureKind::ChainCodeBased | FeatureKind::PolygonBased | FeatureKind::ConvexHullBased
            )
        });
        if needs_boundary {
            self.measure_boundaries(label, selected, &kinds, &labels, options, &mut msr)?;
        }
        if kinds.contains(&FeatureKind::Composite) {
            self.compose(selected, &mut msr)?;
        }

        debug!(
            "measure: {} features ({} values) on {} objects",
            msr.number_of_features(),
            msr.number_of_values(),
            n_objects
        );
        Ok(msr)
    }

    /// Run the line-based features over all image lines along dimension 0.
    fn scan_lines(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        selected: &[usize],
        object_indices: &ObjectIdToIndexMap,
        msr: &mut Measurement,
    ) -> MeasureResult<()> {
        let label_data: Vec<LabelType> = label.to_vec()?;
        let grey_data: Option<Vec<f64>> = grey.map(|g| g.to_vec()).transpose()?;
        let sizes = label.sizes().as_slice();
        let line_length = sizes[0];
        let mut coordinates = vec![0usize; sizes.len()];

        for (line, start) in (0..label_data.len()).step_by(line_length.max(1)).enumerate() {
            if line > 0 {
                // next line: odometer over dimensions 1..
                for d in 1..sizes.len() {
                    coordinates[d] += 1;
                    if coordinates[d] < sizes[d] {
                        break;
                    }
                    coordinates[d] = 0;
                }
            }
            let range = start..start + line_length;
            let scan = LineScan {
                label: &label_data[range.clone()],
                grey: grey_data.as_ref().map(|g| &g[range]),
                coordinates: &coordinates,
                dimension: 0,
                object_indices,
            };
            for &index in selected {
                if let Feature::LineBased(f) = &mut self.features[index] {
                    f.scan_line(&scan);
                }
            }
        }

        for row in 0..msr.number_of_objects() {
            for (k, &index) in selected.iter().enumerate() {
                if let Feature::LineBased(f) = &mut self.features[index] {
                    f.finish(row, msr.cell_mut(row, k));
                }
            }
        }
        Ok(())
    }

    /// Run the chain-code, polygon and convex-hull features on every
    /// object's boundary.
    fn measure_boundaries(
        &mut self,
        label: &Image,
        selected: &[usize],
        kinds: &[FeatureKind],
        labels: &[LabelType],
        options: &MeasureOptions,
        msr: &mut Measurement,
    ) -> MeasureResult<()> {
        let needs_polygon = kinds
            .iter()
            .any(|k| matches!(k, FeatureKind::PolygonBased | FeatureKind::ConvexHullBased));
        let needs_hull = kinds.contains(&FeatureKind::ConvexHullBased);
        let chain_codes = get_image_chain_codes(label, labels, options.connectivity)?;

        for (row, chain_code) in chain_codes.iter().enumerate() {
            for (k, &index) in selected.iter().enumerate() {
                if let Feature::ChainCodeBased(f) = &mut self.features[index] {
                    f.measure(chain_code, msr.cell_mut(row, k))?;
                }
            }
            if !needs_polygon {
                continue;
            }
            let polygon = chain_code.polygon()?;
            for (k, &index) in selected.iter().enumerate() {
                if let Feature::PolygonBased(f) = &mut self.features[index] {
                    f.measure(&polygon, msr.cell_mut(row, k));
                }
            }
            if !needs_hull {
                continue;
            }
            let hull = match ConvexHull::new(&polygon) {
                Ok(hull) => Some(hull),
                Err(e) => {
                    warn!(
                        "measure: no convex hull for object {}: {}",
                        chain_code.object_id, e
                    );
                    None
                }
            };
            for (k, &index) in selected.iter().enumerate() {
                if let Feature::ConvexHullBased(f) = &mut self.features[index] {
                    let output = msr.cell_mut(row, k);
                    match &hull {
                        Some(hull) => f.measure(hull, output),
                        None => output.fill(f64::NAN),
                    }
                }
            }
        }
        Ok(())
    }

    /// Compose the composite features, each after the composites it
    /// depends on.
    fn compose(&mut self, selected: &[usize], msr: &mut Measurement) -> MeasureResult<()> {
        let mut pending: Vec<usize> = (0..selected.len())
            .filter(|&k| self.features[selected[k]].kind() == FeatureKind::Composite)
            .collect();
        while !pending.is_empty() {
            let ready = pending.iter().position(|&k| {
                self.features[selected[k]].dependencies().iter().all(|dep| {
                    !pending
                        .iter()
                        .any(|&other| self.features[selected[other]].name() == dep.as_str())
                })
            });
            let Some(position) = ready else {
                return Err(MeasureError::InvalidParameters(
                    "composite features depend on each other".to_string(),
                ));
            };
            let k = pending.remove(position);
            let Feature::Composite(f) = &mut self.features[selected[k]] else {
                continue;
            };
            let n_values = msr.features()[k].number_values;
            let mut output = vec![0.0; n_values];
            for row in 0..msr.number_of_objects() {
                f.compose(&msr.object_at(row), &mut output)?;
                msr.cell_mut(row, k).copy_from_slice(&output);
            }
        }
        Ok(())
    }
}

fn check_images(label: &Image, grey: Option<&Image>) -> MeasureResult<()> {
    if !label.is_forged() {
        return Err(Error::ImageNotForged.into());
    }
    if !label.is_scalar() {
        return Err(Error::ImageNotScalar.into());
    }
    if !label.data_type().is_uint() {
        return Err(Error::DataTypeNotSupported(label.data_type()).into());
    }
    if label.dimensionality() == 0 {
        return Err(Error::DimensionalityNotSupported(0).into());
    }
    if let Some(grey) = grey {
        if !grey.is_forged() {
            return Err(Error::ImageNotForged.into());
        }
        if !grey.data_type().is_real() {
            return Err(Error::DataTypeNotSupported(grey.data_type()).into());
        }
        if grey.sizes() != label.sizes() {
            return Err(Error::sizes_dont_match(label.sizes(), grey.sizes()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Size;

    fn small_label() -> Image {
        Image::from_vec(&[4, 2], vec![1u16, 1, 0, 3, 0, 1, 0, 3]).unwrap()
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut tool = MeasurementTool::new();
        assert!(tool.exists("Size"));
        assert!(!tool.exists("Volume"));
        assert!(matches!(
            tool.register(Feature::LineBased(Box::new(Size::new()))),
            Err(MeasureError::FeatureExists(_))
        ));
        assert_eq!(tool.features()[0].name, "Size");
    }

    #[test]
    fn test_resolve_appends_dependencies_once() {
        let tool = MeasurementTool::new();
        let selected = tool.resolve(&["Solidity", "Size", "Solidity"], false).unwrap();
        let names: Vec<&str> = selected.iter().map(|&i| tool.features[i].name()).collect();
        assert_eq!(names, vec!["Solidity", "Size", "ConvexArea"]);
    }

    #[test]
    fn test_measure_errors() {
        let mut tool = MeasurementTool::new();
        let label = small_label();
        let options = MeasureOptions::default();
        assert!(matches!(
            tool.measure(&label, None, &["Volume"], &[], &options),
            Err(MeasureError::Core(Error::InvalidFlag(_)))
        ));
        assert!(matches!(
            tool.measure(&label, None, &["Mean"], &[], &options),
            Err(MeasureError::Core(Error::InvalidParameter(_)))
        ));
        let grey = Image::from_vec(&[2, 4], vec![0.0f32; 8]).unwrap();
        assert!(matches!(
            tool.measure(&label, Some(&grey), &["Mean"], &[], &options),
            Err(MeasureError::Core(Error::SizesDontMatch(..)))
        ));
        assert!(matches!(
            tool.measure(&label, None, &[], &[], &options),
            Err(MeasureError::InvalidParameters(_))
        ));
        let float_label = Image::from_vec(&[2], vec![1.0f32, 0.0]).unwrap();
        assert!(matches!(
            tool.measure(&float_label, None, &["Size"], &[], &options),
            Err(MeasureError::Core(Error::DataTypeNotSupported(_)))
        ));
    }

    #[test]
    fn test_measure_selected_objects() {
        let mut tool = MeasurementTool::new();
        let label = small_label();
        let msr = tool
            .measure(&label, None, &["Size", "Maximum"], &[3, 7], &MeasureOptions::default())
            .unwrap();
        assert_eq!(msr.objects(), &[3, 7]);
        assert_eq!(msr[("Size", 3)], [2.0]);
        assert_eq!(msr[("Maximum", 3)], [3.0, 1.0]);
        // object 7 is not in the image
        assert_eq!(msr[("Size", 7)], [0.0]);
    }

    #[test]
    fn test_measure_without_objects() {
        let mut tool = MeasurementTool::new();
        let label = Image::from_vec(&[3, 3], vec![0u8; 9]).unwrap();
        let msr = tool
            .measure(&label, None, &["Size", "Perimeter"], &[], &MeasureOptions::default())
            .unwrap();
        assert_eq!(msr.number_of_objects(), 0);
        assert_eq!(msr.number_of_features(), 2);
    }
}
