//! Features accumulated over image lines
//!
//! These work on images of any dimensionality. Each keeps one accumulator
//! per object, filled by [`LineBased::scan_line`] and turned into values by
//! [`LineBased::finish`].

use diplib_core::{Error, Image, Units};

use crate::error::MeasureResult;
use crate::feature::{
    FeatureBase, FeatureInformation, LineBased, LineScan, ValueInformation, dimension_scale,
    unit_size_scale,
};

/// One `dim{d}` value per dimension, scaled by the pixel size along it.
fn coordinate_values(label: &Image) -> (Vec<f64>, Vec<ValueInformation>) {
    (0..label.dimensionality())
        .map(|d| {
            let (scale, units) = dimension_scale(label, d);
            (scale, ValueInformation::new(format!("dim{}", d), units))
        })
        .unzip()
}

fn require_grey(grey: Option<&Image>, feature: &str) -> MeasureResult<()> {
    match grey {
        None => Err(Error::InvalidParameter(format!("feature {} needs a grey-value image", feature)).into()),
        Some(g) if !g.is_scalar() => Err(Error::ImageNotScalar.into()),
        Some(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Number of object pixels, times the pixel area or volume.
pub struct Size {
    info: FeatureInformation,
    counts: Vec<usize>,
    scale: f64,
}

impl Size {
    pub fn new() -> Self {
        Size {
            info: FeatureInformation::new("Size", "Number of object pixels", false),
            counts: Vec::new(),
            scale: 1.0,
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Size {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        self.counts = vec![0; n_objects];
        let (scale, units) = unit_size_scale(label);
        self.scale = scale;
        Ok(vec![ValueInformation::new("", units)])
    }

    fn cleanup(&mut self) {
        self.counts = Vec::new();
    }
}

impl LineBased for Size {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        line.for_each_object_pixel(|index, _| self.counts[index] += 1);
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        output[0] = self.counts[object_index] as f64 * self.scale;
    }
}

// ---------------------------------------------------------------------------
// Minimum, Maximum, CartesianBox
// ---------------------------------------------------------------------------

/// Per-object bounding box in pixel coordinates.
#[derive(Debug, Default)]
struct Bounds {
    n_dims: usize,
    lower: Vec<usize>,
    upper: Vec<usize>,
    seen: Vec<bool>,
}

impl Bounds {
    fn reset(&mut self, n_dims: usize, n_objects: usize) {
        self.n_dims = n_dims;
        self.lower = vec![usize::MAX; n_dims * n_objects];
        self.upper = vec![0; n_dims * n_objects];
        self.seen = vec![false; n_objects];
    }

    fn clear(&mut self) {
        *self = Bounds::default();
    }

    fn scan(&mut self, line: &LineScan<'_>) {
        let n = self.n_dims;
        line.for_each_object_pixel(|index, pos| {
            self.seen[index] = true;
            for d in 0..n {
                let c = line.coordinate(d, pos);
                let k = index * n + d;
                self.lower[k] = self.lower[k].min(c);
                self.upper[k] = self.upper[k].max(c);
            }
        });
    }

    /// `(lower, upper)` along `d`, `None` for an empty object.
    fn get(&self, object_index: usize, d: usize) -> Option<(usize, usize)> {
        let k = object_index * self.n_dims + d;
        self.seen[object_index].then(|| (self.lower[k], self.upper[k]))
    }
}

/// Which corner of the bounding box a [`BoundingBoxFeature`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoxValue {
    Minimum,
    Maximum,
    Extent,
}

/// `Minimum`, `Maximum` and `CartesianBox`: the bounding box corners and
/// its extent. Empty objects give zeros.
pub struct BoundingBoxFeature {
    info: FeatureInformation,
    kind: BoxValue,
    bounds: Bounds,
    scales: Vec<f64>,
}

impl BoundingBoxFeature {
    fn with_kind(kind: BoxValue) -> Self {
        let info = match kind {
            BoxValue::Minimum => FeatureInformation::new(
                "Minimum",
                "Minimum coordinates of the object",
                false,
            ),
            BoxValue::Maximum => FeatureInformation::new(
                "Maximum",
                "Maximum coordinates of the object",
                false,
            ),
            BoxValue::Extent => FeatureInformation::new(
                "CartesianBox",
                "Cartesian box size of the object in all dimensions",
                false,
            ),
        };
        BoundingBoxFeature {
            info,
            kind,
            bounds: Bounds::default(),
            scales: Vec::new(),
        }
    }

    pub fn minimum() -> Self {
        Self::with_kind(BoxValue::Minimum)
    }

    pub fn maximum() -> Self {
        Self::with_kind(BoxValue::Maximum)
    }

    pub fn cartesian_box() -> Self {
        Self::with_kind(BoxValue::Extent)
    }
}

impl FeatureBase for BoundingBoxFeature {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        self.bounds.reset(label.dimensionality(), n_objects);
        let (scales, values) = coordinate_values(label);
        self.scales = scales;
        Ok(values)
    }

    fn cleanup(&mut self) {
        self.bounds.clear();
        self.scales.clear();
    }
}

impl LineBased for BoundingBoxFeature {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        self.bounds.scan(line);
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        for (d, (out, scale)) in output.iter_mut().zip(&self.scales).enumerate() {
            let value = match (self.bounds.get(object_index, d), self.kind) {
                (None, _) => 0,
                (Some((lower, _)), BoxValue::Minimum) => lower,
                (Some((_, upper)), BoxValue::Maximum) => upper,
                (Some((lower, upper)), BoxValue::Extent) => upper - lower + 1,
            };
            *out = value as f64 * scale;
        }
    }
}

// ---------------------------------------------------------------------------
// Center
// ---------------------------------------------------------------------------

/// Mean of the object's pixel coordinates.
pub struct Center {
    info: FeatureInformation,
    n_dims: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
    scales: Vec<f64>,
}

impl Center {
    pub fn new() -> Self {
        Center {
            info: FeatureInformation::new(
                "Center",
                "Coordinates of the geometric mean of the object",
                false,
            ),
            n_dims: 0,
            sums: Vec::new(),
            counts: Vec::new(),
            scales: Vec::new(),
        }
    }
}

impl Default for Center {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Center {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        self.n_dims = label.dimensionality();
        self.sums = vec![0.0; self.n_dims * n_objects];
        self.counts = vec![0; n_objects];
        let (scales, values) = coordinate_values(label);
        self.scales = scales;
        Ok(values)
    }

    fn cleanup(&mut self) {
        self.sums = Vec::new();
        self.counts = Vec::new();
    }
}

impl LineBased for Center {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        let n = self.n_dims;
        line.for_each_object_pixel(|index, pos| {
            self.counts[index] += 1;
            for d in 0..n {
                self.sums[index * n + d] += line.coordinate(d, pos) as f64;
            }
        });
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        let count = self.counts[object_index];
        for (d, out) in output.iter_mut().enumerate() {
            *out = if count == 0 {
                0.0
            } else {
                self.sums[object_index * self.n_dims + d] / count as f64 * self.scales[d]
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Mu
// ---------------------------------------------------------------------------

/// Raw moments up to second order of one object's pixel coordinates.
#[derive(Debug, Clone, Default)]
struct MomentAccumulator {
    m0: f64,
    m1: Vec<f64>,
    /// Diagonal first, then the lower triangle row by row
    m2: Vec<f64>,
}

impl MomentAccumulator {
    fn new(n_dims: usize) -> Self {
        MomentAccumulator {
            m0: 0.0,
            m1: vec![0.0; n_dims],
            m2: vec![0.0; n_dims * (n_dims + 1) / 2],
        }
    }

    fn push(&mut self, pos: &[f64]) {
        let n = self.m1.len();
        self.m0 += 1.0;
        for (ii, &p) in pos.iter().enumerate() {
            self.m1[ii] += p;
            self.m2[ii] += p * p;
        }
        let mut kk = n;
        for ii in 1..n {
            for jj in 0..ii {
                self.m2[kk] += pos[ii] * pos[jj];
                kk += 1;
            }
        }
    }

    /// Elements of the inertia tensor, in the layout of `m2`.
    fn second_order(&self) -> Vec<f64> {
        let n = self.m1.len();
        let mut out = vec![0.0; self.m2.len()];
        if self.m0 == 0.0 {
            return out;
        }
        let mut central = vec![0.0; self.m2.len()];
        for ii in 0..n {
            central[ii] = (self.m2[ii] - self.m1[ii] * self.m1[ii] / self.m0) / self.m0;
        }
        let mut kk = n;
        for ii in 1..n {
            for jj in 0..ii {
                central[kk] = (self.m2[kk] - self.m1[ii] * self.m1[jj] / self.m0) / self.m0;
                kk += 1;
            }
        }
        for ii in 0..n {
            out[ii] = (0..n).filter(|&jj| jj != ii).map(|jj| central[jj]).sum();
        }
        for kk in n..out.len() {
            out[kk] = -central[kk];
        }
        out
    }
}

/// Elements of the inertia tensor: the diagonal `Mu_i_i`, then `Mu_i_j`
/// for `j < i`.
pub struct Mu {
    info: FeatureInformation,
    data: Vec<MomentAccumulator>,
    scales: Vec<f64>,
}

impl Mu {
    pub fn new() -> Self {
        Mu {
            info: FeatureInformation::new("Mu", "Elements of the inertia tensor", false),
            data: Vec::new(),
            scales: Vec::new(),
        }
    }
}

impl Default for Mu {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBase for Mu {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        _grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        let n = label.dimensionality();
        self.data = vec![MomentAccumulator::new(n); n_objects];
        let mut pairs: Vec<(usize, usize)> = (0..n).map(|ii| (ii, ii)).collect();
        for ii in 1..n {
            pairs.extend((0..ii).map(|jj| (ii, jj)));
        }
        let mut values = Vec::with_capacity(pairs.len());
        self.scales.clear();
        for (ii, jj) in pairs {
            let (s1, u1) = dimension_scale(label, ii);
            let (s2, u2) = dimension_scale(label, jj);
            self.scales.push(s1 * s2);
            values.push(ValueInformation::new(format!("Mu_{}_{}", ii, jj), &u1 * &u2));
        }
        Ok(values)
    }

    fn cleanup(&mut self) {
        self.data = Vec::new();
        self.scales.clear();
    }
}

impl LineBased for Mu {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        let mut pos: Vec<f64> = line.coordinates.iter().map(|&c| c as f64).collect();
        let start = pos[line.dimension];
        line.for_each_object_pixel(|index, offset| {
            pos[line.dimension] = start + offset as f64;
            self.data[index].push(&pos);
        });
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        let values = self.data[object_index].second_order();
        for ((out, v), s) in output.iter_mut().zip(values).zip(&self.scales) {
            *out = v * s;
        }
    }
}

// ---------------------------------------------------------------------------
// Grey-value features
// ---------------------------------------------------------------------------

/// Which statistic of the grey values a [`GreyFeature`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GreyValue {
    Mass,
    Mean,
    MaxVal,
    MinVal,
}

/// `Mass`, `Mean`, `MaxVal` and `MinVal`: statistics of the grey values
/// under each object. Empty objects give 0.
pub struct GreyFeature {
    info: FeatureInformation,
    kind: GreyValue,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl GreyFeature {
    fn with_kind(kind: GreyValue) -> Self {
        let (name, description) = match kind {
            GreyValue::Mass => ("Mass", "Mass of object (sum of object intensity)"),
            GreyValue::Mean => ("Mean", "Mean object intensity"),
            GreyValue::MaxVal => ("MaxVal", "Maximum object intensity"),
            GreyValue::MinVal => ("MinVal", "Minimum object intensity"),
        };
        GreyFeature {
            info: FeatureInformation::new(name, description, true),
            kind,
            sums: Vec::new(),
            counts: Vec::new(),
        }
    }

    pub fn mass() -> Self {
        Self::with_kind(GreyValue::Mass)
    }

    pub fn mean() -> Self {
        Self::with_kind(GreyValue::Mean)
    }

    pub fn max_val() -> Self {
        Self::with_kind(GreyValue::MaxVal)
    }

    pub fn min_val() -> Self {
        Self::with_kind(GreyValue::MinVal)
    }

    fn initial(&self) -> f64 {
        match self.kind {
            GreyValue::Mass | GreyValue::Mean => 0.0,
            GreyValue::MaxVal => f64::NEG_INFINITY,
            GreyValue::MinVal => f64::INFINITY,
        }
    }
}

impl FeatureBase for GreyFeature {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        _label: &Image,
        grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_grey(grey, &self.info.name)?;
        self.sums = vec![self.initial(); n_objects];
        self.counts = vec![0; n_objects];
        Ok(vec![ValueInformation::new("", Units::dimensionless())])
    }

    fn cleanup(&mut self) {
        self.sums = Vec::new();
        self.counts = Vec::new();
    }
}

impl LineBased for GreyFeature {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        let Some(grey) = line.grey else {
            return;
        };
        let kind = self.kind;
        line.for_each_object_pixel(|index, pos| {
            let v = grey[pos];
            let acc = &mut self.sums[index];
            match kind {
                GreyValue::Mass | GreyValue::Mean => *acc += v,
                GreyValue::MaxVal => *acc = acc.max(v),
                GreyValue::MinVal => *acc = acc.min(v),
            }
            self.counts[index] += 1;
        });
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        let count = self.counts[object_index];
        output[0] = match self.kind {
            _ if count == 0 => 0.0,
            GreyValue::Mean => self.sums[object_index] / count as f64,
            _ => self.sums[object_index],
        };
    }
}

/// `MaxPos` and `MinPos`: coordinates of the first pixel, in scan order,
/// with the extreme grey value.
pub struct ExtremePosition {
    info: FeatureInformation,
    find_maximum: bool,
    n_dims: usize,
    best: Vec<f64>,
    positions: Vec<usize>,
    scales: Vec<f64>,
}

impl ExtremePosition {
    fn with_direction(find_maximum: bool) -> Self {
        let info = if find_maximum {
            FeatureInformation::new("MaxPos", "Position of pixel with maximum intensity", true)
        } else {
            FeatureInformation::new("MinPos", "Position of pixel with minimum intensity", true)
        };
        ExtremePosition {
            info,
            find_maximum,
            n_dims: 0,
            best: Vec::new(),
            positions: Vec::new(),
            scales: Vec::new(),
        }
    }

    pub fn max_pos() -> Self {
        Self::with_direction(true)
    }

    pub fn min_pos() -> Self {
        Self::with_direction(false)
    }
}

impl FeatureBase for ExtremePosition {
    fn information(&self) -> &FeatureInformation {
        &self.info
    }

    fn initialize(
        &mut self,
        label: &Image,
        grey: Option<&Image>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_grey(grey, &self.info.name)?;
        self.n_dims = label.dimensionality();
        let start = if self.find_maximum {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        self.best = vec![start; n_objects];
        self.positions = vec![0; n_objects * self.n_dims];
        let (scales, values) = coordinate_values(label);
        self.scales = scales;
        Ok(values)
    }

    fn cleanup(&mut self) {
        self.best = Vec::new();
        self.positions = Vec::new();
    }
}

impl LineBased for ExtremePosition {
    fn scan_line(&mut self, line: &LineScan<'_>) {
        let Some(grey) = line.grey else {
            return;
        };
        let n = self.n_dims;
        let find_maximum = self.find_maximum;
        line.for_each_object_pixel(|index, pos| {
            let v = grey[pos];
            let best = &mut self.best[index];
            let better = if find_maximum { v > *best } else { v < *best };
            if better {
                *best = v;
                for d in 0..n {
                    self.positions[index * n + d] = line.coordinate(d, pos);
                }
            }
        });
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        let n = self.n_dims;
        for (d, out) in output.iter_mut().enumerate() {
            *out = self.positions[object_index * n + d] as f64 * self.scales[d];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::ObjectIdToIndexMap;

    /// Feed a 2-D label image (and grey image) to `feature` line by line.
    fn run(
        feature: &mut dyn LineBased,
        sizes: [usize; 2],
        label: &[u32],
        grey: Option<&[f64]>,
        ids: &[u32],
    ) -> Vec<Vec<f64>> {
        let label_img = Image::from_vec(&sizes, label.to_vec()).unwrap();
        let grey_img = grey.map(|g| Image::from_vec(&sizes, g.to_vec()).unwrap());
        let values = feature
            .initialize(&label_img, grey_img.as_ref(), ids.len())
            .unwrap();
        let indices: ObjectIdToIndexMap = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        for y in 0..sizes[1] {
            let range = y * sizes[0]..(y + 1) * sizes[0];
            feature.scan_line(&LineScan {
                label: &label[range.clone()],
                grey: grey.map(|g| &g[range]),
                coordinates: &[0, y],
                dimension: 0,
                object_indices: &indices,
            });
        }
        (0..ids.len())
            .map(|i| {
                let mut out = vec![0.0; values.len()];
                feature.finish(i, &mut out);
                out
            })
            .collect()
    }

    const LABEL: [u32; 12] = [
        0, 1, 1, 0, //
        2, 1, 0, 0, //
        2, 2, 0, 0, //
    ];

    #[test]
    fn test_size_and_bounds() {
        assert_eq!(run(&mut Size::new(), [4, 3], &LABEL, None, &[1, 2, 3]), vec![
            vec![3.0],
            vec![3.0],
            vec![0.0]
        ]);
        let minimum = run(&mut BoundingBoxFeature::minimum(), [4, 3], &LABEL, None, &[1, 2]);
        assert_eq!(minimum, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let boxes = run(&mut BoundingBoxFeature::cartesian_box(), [4, 3], &LABEL, None, &[1, 2, 9]);
        assert_eq!(boxes, vec![vec![2.0, 2.0], vec![2.0, 2.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_center_skips_unlisted_objects() {
        let center = run(&mut Center::new(), [4, 3], &LABEL, None, &[2]);
        assert_eq!(center.len(), 1);
        assert!((center[0][0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((center[0][1] - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mu_of_rectangle() {
        // 6 x 2 rectangle: variance 35/12 along x and 1/4 along y
        let label = [1u32; 12];
        let mut mu = Mu::new();
        let out = run(&mut mu, [6, 2], &label, None, &[1]);
        assert!((out[0][0] - 0.25).abs() < 1e-12);
        assert!((out[0][1] - 35.0 / 12.0).abs() < 1e-12);
        assert!(out[0][2].abs() < 1e-12);
    }

    #[test]
    fn test_grey_features() {
        let grey = [
            9.0, 1.0, 5.0, 9.0, //
            2.0, 5.0, 9.0, 9.0, //
            4.0, 4.0, 9.0, 9.0, //
        ];
        let ids = [1, 2];
        let mass = run(&mut GreyFeature::mass(), [4, 3], &LABEL, Some(&grey), &ids);
        assert_eq!(mass, vec![vec![11.0], vec![10.0]]);
        let max_val = run(&mut GreyFeature::max_val(), [4, 3], &LABEL, Some(&grey), &ids);
        assert_eq!(max_val, vec![vec![5.0], vec![4.0]]);
        // the first of the two maxima in scan order
        let max_pos = run(&mut ExtremePosition::max_pos(), [4, 3], &LABEL, Some(&grey), &ids);
        assert_eq!(max_pos, vec![vec![2.0, 0.0], vec![0.0, 2.0]]);
        let min_pos = run(&mut ExtremePosition::min_pos(), [4, 3], &LABEL, Some(&grey), &ids);
        assert_eq!(min_pos, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_grey_feature_requires_grey() {
        let label = Image::from_vec(&[2], vec![1u32, 0]).unwrap();
        assert!(GreyFeature::mean().initialize(&label, None, 1).is_err());
    }
}
