//! Statistics over a measurement column
//!
//! All functions work on the first value of a [`FeatureColumn`]; use
//! [`FeatureColumn::subset`] to pick another value of a multi-valued
//! feature.

use diplib_core::{Error, Image};

use crate::error::{MeasureError, MeasureResult};
use crate::measurement::FeatureColumn;

/// Smallest value, or 0 for an empty column.
pub fn minimum(column: &FeatureColumn<'_>) -> f64 {
    column.first_values().reduce(f64::min).unwrap_or(0.0)
}

/// Largest value, or 0 for an empty column.
pub fn maximum(column: &FeatureColumn<'_>) -> f64 {
    column.first_values().reduce(f64::max).unwrap_or(0.0)
}

/// Rank of percentile `p` among `n` sorted values. Ranks above the median
/// are counted from the top so the function is symmetric.
fn rank_from_percentile(p: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    if p > 50.0 {
        return n - 1 - rank_from_percentile(100.0 - p, n);
    }
    let rank = (p.max(0.0) / 100.0 * (n - 1) as f64 + 0.5).floor() as usize;
    rank.min(n - 1)
}

/// The `p`-th percentile (0 to 100) of the values, or 0 for an empty
/// column.
///
/// # Examples
///
/// ```
/// use diplib_core::Units;
/// use diplib_measure::{Measurement, ValueInformation, statistics};
///
/// let mut msr = Measurement::new();
/// msr.set_object_ids(vec![1, 2, 3, 4, 5]).unwrap();
/// msr.add_feature("A", vec![ValueInformation::new("", Units::dimensionless())]).unwrap();
/// msr.forge();
/// for (id, v) in [(1, 5.0), (2, 1.0), (3, 4.0), (4, 2.0), (5, 3.0)] {
///     msr.value_mut("A", id).unwrap()[0] = v;
/// }
/// let column = msr.feature("A").unwrap();
/// assert_eq!(statistics::percentile(&column, 0.0), 1.0);
/// assert_eq!(statistics::median(&column), 3.0);
/// assert_eq!(statistics::percentile(&column, 80.0), 4.0);
/// ```
pub fn percentile(column: &FeatureColumn<'_>, p: f64) -> f64 {
    let mut values: Vec<f64> = column.first_values().collect();
    if values.is_empty() {
        return 0.0;
    }
    let rank = rank_from_percentile(p, values.len());
    let (_, value, _) = values.select_nth_unstable_by(rank, f64::total_cmp);
    *value
}

pub fn median(column: &FeatureColumn<'_>) -> f64 {
    percentile(column, 50.0)
}

/// Mean value, or 0 for an empty column.
pub fn mean(column: &FeatureColumn<'_>) -> f64 {
    let n = column.number_of_objects();
    if n == 0 {
        return 0.0;
    }
    column.first_values().sum::<f64>() / n as f64
}

/// Both extremes of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxValues {
    pub minimum: f64,
    pub maximum: f64,
}

impl MinMaxValues {
    pub fn range(&self) -> f64 {
        self.maximum - self.minimum
    }
}

/// Minimum and maximum in one pass. An empty column gives `+inf` and
/// `-inf`.
pub fn maximum_and_minimum(column: &FeatureColumn<'_>) -> MinMaxValues {
    column.first_values().fold(
        MinMaxValues {
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
        },
        |acc, v| MinMaxValues {
            minimum: acc.minimum.min(v),
            maximum: acc.maximum.max(v),
        },
    )
}

/// First four moments of a column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatisticsValues {
    pub number: usize,
    pub mean: f64,
    /// Unbiased sample variance
    pub variance: f64,
    pub standard_deviation: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

/// Sample statistics of the values. Moments that need more values than
/// are present are 0.
pub fn sample_statistics(column: &FeatureColumn<'_>) -> StatisticsValues {
    let values: Vec<f64> = column.first_values().collect();
    let n = values.len();
    if n == 0 {
        return StatisticsValues::default();
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in &values {
        let d = v - mean;
        m2 += d * d;
        m3 += d * d * d;
        m4 += d * d * d * d;
    }
    let mut out = StatisticsValues {
        number: n,
        mean,
        ..Default::default()
    };
    if n > 1 {
        out.variance = m2 / (nf - 1.0);
        out.standard_deviation = out.variance.sqrt();
    }
    if m2 > 0.0 {
        let biased = m2 / nf;
        out.skewness = (m3 / nf) / biased.powf(1.5);
        out.excess_kurtosis = (m4 / nf) / (biased * biased) - 3.0;
    }
    out
}

fn object_extreme(
    column: &FeatureColumn<'_>,
    better: impl Fn(f64, f64) -> bool,
) -> MeasureResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (id, values) in column.iter() {
        match best {
            Some((_, v)) if !better(values[0], v) => {}
            _ => best = Some((id, values[0])),
        }
    }
    best.map(|(id, _)| id).ok_or(MeasureError::NoObjects)
}

/// ID of the object with the smallest value; the first one on ties.
pub fn object_minimum(column: &FeatureColumn<'_>) -> MeasureResult<usize> {
    object_extreme(column, |a, b| a < b)
}

/// ID of the object with the largest value; the first one on ties.
pub fn object_maximum(column: &FeatureColumn<'_>) -> MeasureResult<usize> {
    object_extreme(column, |a, b| a > b)
}

/// Paint every object of `label` with its value in `column`. Background
/// and objects not in the measurement are 0. The output is a single-float
/// image with the pixel size of `label`.
pub fn object_to_measurement(label: &Image, column: &FeatureColumn<'_>) -> MeasureResult<Image> {
    if !label.is_forged() {
        return Err(Error::ImageNotForged.into());
    }
    if !label.is_scalar() {
        return Err(Error::ImageNotScalar.into());
    }
    if !label.data_type().is_uint() {
        return Err(Error::DataTypeNotSupported(label.data_type()).into());
    }
    let ids = label.to_vec::<u32>()?;
    let data: Vec<f32> = ids
        .iter()
        .map(|&id| match id {
            0 => 0.0,
            id => column.object(id as usize).map_or(0.0, |v| v[0] as f32),
        })
        .collect();
    let mut out = Image::from_vec(label.sizes().as_slice(), data)?;
    out.set_pixel_size(label.pixel_size().clone());
    Ok(out)
}
