//! Histogram - bounded multi-dimensional count image
//!
//! A [`Histogram`] stores bin counts in a `UInt32` [`Image`] with one image
//! axis per input channel, together with the lower bound and bin size of
//! each axis. Bin `i` along an axis covers `[lower + i·size, lower + (i+1)·size)`.
//!
//! # Examples
//!
//! ```
//! use diplib_core::{Histogram, HistogramConfiguration, Image};
//!
//! let img = Image::from_vec(&[6], vec![0u8, 1, 1, 2, 2, 2]).unwrap();
//! let hist = Histogram::from_image(&img, None, &HistogramConfiguration::default()).unwrap();
//! assert_eq!(hist.bins(0), 256);
//! assert_eq!(hist.bin_center(2), 2.0);
//! assert_eq!(hist.counts()[..3], [1, 2, 3]);
//! ```

use log::debug;

use crate::datatype::DataType;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::{FloatArray, UnsignedArray};

/// Truncation of the Gaussian used by [`Histogram::smooth`], in sigmas.
const SMOOTH_TRUNCATION: f64 = 3.0;

/// How the bins of a histogram are laid out.
///
/// Unset bounds are taken from the data: `UInt8` images use `[0, 256)`,
/// `SInt8` images `[-128, 128)`, every other type the sample range. Unless
/// given, the number of bins is 256, except for other integer types where
/// the bin size is chosen as a power of two giving at most 256 bins.
/// Integer images always get integer bin sizes and integer bin centres.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramConfiguration {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub n_bins: Option<usize>,
    /// When given and `n_bins` is not, the number of bins is computed
    pub bin_size: Option<f64>,
    /// Drop samples outside the bounds instead of counting them in the
    /// first or last bin
    pub exclude_out_of_bound_values: bool,
}

impl Default for HistogramConfiguration {
    fn default() -> Self {
        Self {
            lower_bound: None,
            upper_bound: None,
            n_bins: None,
            bin_size: None,
            exclude_out_of_bound_values: false,
        }
    }
}

impl HistogramConfiguration {
    /// `n_bins` bins between `lower_bound` and `upper_bound`.
    pub fn new(lower_bound: f64, upper_bound: f64, n_bins: usize) -> Self {
        Self {
            lower_bound: Some(lower_bound),
            upper_bound: Some(upper_bound),
            n_bins: Some(n_bins),
            ..Self::default()
        }
    }

    /// Bins of size `bin_size` between `lower_bound` and `upper_bound`.
    pub fn with_bin_size(lower_bound: f64, upper_bound: f64, bin_size: f64) -> Self {
        Self {
            lower_bound: Some(lower_bound),
            upper_bound: Some(upper_bound),
            bin_size: Some(bin_size),
            ..Self::default()
        }
    }

    pub fn with_n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = Some(n_bins);
        self
    }

    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = Some(lower_bound);
        self.upper_bound = Some(upper_bound);
        self
    }

    pub fn with_exclude_out_of_bound_values(mut self, exclude: bool) -> Self {
        self.exclude_out_of_bound_values = exclude;
        self
    }

    /// Resolve to concrete `(lower_bound, n_bins, bin_size)` for data of
    /// type `data_type` whose sample range is `(min, max)`.
    fn complete(&self, data_type: DataType, (min, max): (f64, f64)) -> (f64, usize, f64) {
        let (default_lower, default_upper) = match data_type {
            DataType::UInt8 => (0.0, 256.0),
            DataType::SInt8 => (-128.0, 128.0),
            // the upper bound is exclusive, keep the maximum inside
            _ => (min, max + max.abs() * 1e-15),
        };
        let mut lower = self.lower_bound.unwrap_or(default_lower);
        let mut upper = self.upper_bound.unwrap_or(default_upper);
        if upper < lower {
            std::mem::swap(&mut lower, &mut upper);
        } else if upper == lower {
            upper += 1.0;
        }
        let is_integer = data_type.is_integer();
        let power_of_two = is_integer
            && !matches!(data_type, DataType::UInt8 | DataType::SInt8)
            && self.n_bins.is_none()
            && self.bin_size.is_none();
        let compute_bins = self.n_bins.is_none() && self.bin_size.is_some_and(|s| s > 0.0);

        let (lower, n_bins, bin_size) = if is_integer {
            let mut lower = lower.floor();
            let upper = upper.ceil();
            if power_of_two {
                let range = upper - lower;
                let bin_size = 2f64.powf((range / 256.0).log2().ceil()).round().max(1.0);
                lower = (lower / bin_size).floor() * bin_size;
                let n_bins = ((upper - lower) / bin_size).ceil().max(1.0) as usize;
                (lower, n_bins, bin_size)
            } else if compute_bins {
                let bin_size = self.bin_size.unwrap_or(1.0).ceil();
                let n_bins = ((upper - lower) / bin_size).round().max(1.0) as usize;
                (lower, n_bins, bin_size)
            } else {
                let n_bins = self.n_bins.filter(|&n| n > 0).unwrap_or(256);
                let bin_size = ((upper - lower) / n_bins as f64).ceil().max(1.0);
                (lower, n_bins, bin_size)
            }
        } else if compute_bins {
            let n_bins = ((upper - lower) / self.bin_size.unwrap_or(1.0))
                .round()
                .max(1.0) as usize;
            (lower, n_bins, (upper - lower) / n_bins as f64)
        } else {
            let n_bins = self.n_bins.filter(|&n| n > 0).unwrap_or(256);
            (lower, n_bins, (upper - lower) / n_bins as f64)
        };
        // integer bin centres for odd integer bin sizes
        if is_integer && (bin_size as u64) % 2 == 1 {
            (lower - 0.5, n_bins, bin_size)
        } else {
            (lower, n_bins, bin_size)
        }
    }
}

/// Bin index of `value`, or `None` if it is out of bounds and those values
/// are excluded.
fn find_bin(value: f64, lower: f64, bin_size: f64, n_bins: usize, exclude: bool) -> Option<usize> {
    let bin = ((value - lower) / bin_size).floor();
    if exclude && (bin < 0.0 || bin >= n_bins as f64) {
        return None;
    }
    Some(bin.clamp(0.0, (n_bins - 1) as f64) as usize)
}

/// A histogram: bin counts plus the bin layout of every axis.
#[derive(Debug, Clone)]
pub struct Histogram {
    data: Image,
    lower_bounds: FloatArray,
    bin_sizes: FloatArray,
}

impl Histogram {
    /// 1-D histogram over existing counts.
    pub fn from_counts(counts: Vec<u32>, lower_bound: f64, bin_size: f64) -> Result<Histogram> {
        if counts.is_empty() || bin_size <= 0.0 {
            return Err(Error::InvalidParameter(
                "histogram needs at least one bin of positive size".into(),
            ));
        }
        let n = counts.len();
        Ok(Histogram {
            data: Image::from_vec(&[n], counts)?,
            lower_bounds: FloatArray::from_slice(&[lower_bound]),
            bin_sizes: FloatArray::from_slice(&[bin_size]),
        })
    }

    /// Histogram of the samples of `image` at the pixels selected by
    /// `mask`. A scalar image gives a 1-D histogram; a tensor image gives
    /// a joint histogram with one axis per tensor element, all laid out by
    /// the same `configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataTypeNotSupported`] for complex images.
    pub fn from_image(
        image: &Image,
        mask: Option<&Image>,
        configuration: &HistogramConfiguration,
    ) -> Result<Histogram> {
        image.require_forged()?;
        let data_type = image.data_type();
        if data_type.is_complex() {
            return Err(Error::DataTypeNotSupported(data_type));
        }
        let n_channels = image.tensor_elements();
        let values = image.masked_values(mask)?;

        let mut layout = Vec::with_capacity(n_channels);
        for channel in 0..n_channels {
            let range = values
                .iter()
                .skip(channel)
                .step_by(n_channels)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            let range = if range.0 > range.1 { (0.0, 0.0) } else { range };
            layout.push(configuration.complete(data_type, range));
        }
        let sizes: Vec<usize> = layout.iter().map(|&(_, n, _)| n).collect();
        let strides = crate::image::normal_strides(&sizes, 1);
        let total: usize = sizes.iter().product();
        let mut counts = vec![0u32; total];

        'pixel: for pixel in values.chunks_exact(n_channels) {
            let mut index = 0usize;
            for (channel, &v) in pixel.iter().enumerate() {
                let (lower, n_bins, bin_size) = layout[channel];
                match find_bin(v, lower, bin_size, n_bins, configuration.exclude_out_of_bound_values) {
                    Some(bin) => index += bin * strides[channel] as usize,
                    None => continue 'pixel,
                }
            }
            counts[index] = counts[index].saturating_add(1);
        }
        debug!(
            "histogram of {} pixels into {:?} bins",
            values.len() / n_channels,
            sizes
        );
        Ok(Histogram {
            data: Image::from_vec(&sizes, counts)?,
            lower_bounds: layout.iter().map(|&(l, _, _)| l).collect(),
            bin_sizes: layout.iter().map(|&(_, _, s)| s).collect(),
        })
    }

    /// The count image.
    pub fn image(&self) -> &Image {
        &self.data
    }

    pub fn dimensionality(&self) -> usize {
        self.data.dimensionality()
    }

    /// Number of bins along `dim`.
    pub fn bins(&self, dim: usize) -> usize {
        self.data.size(dim)
    }

    pub fn lower_bound(&self, dim: usize) -> f64 {
        self.lower_bounds[dim]
    }

    pub fn upper_bound(&self, dim: usize) -> f64 {
        self.lower_bounds[dim] + self.bins(dim) as f64 * self.bin_sizes[dim]
    }

    pub fn bin_size(&self, dim: usize) -> f64 {
        self.bin_sizes[dim]
    }

    /// Centre of bin `bin` along the first axis.
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.lower_bounds[0] + (bin as f64 + 0.5) * self.bin_sizes[0]
    }

    /// Centres of all bins along `dim`.
    pub fn bin_centers(&self, dim: usize) -> Vec<f64> {
        (0..self.bins(dim))
            .map(|i| self.lower_bounds[dim] + (i as f64 + 0.5) * self.bin_sizes[dim])
            .collect()
    }

    /// The `bins + 1` bin edges along the first axis.
    pub fn bin_boundaries(&self) -> Vec<f64> {
        (0..=self.bins(0))
            .map(|i| self.lower_bounds[0] + i as f64 * self.bin_sizes[0])
            .collect()
    }

    /// All counts, axis 0 varying fastest.
    pub fn counts(&self) -> Vec<u32> {
        // the count image is always forged with type UInt32
        self.data.to_vec::<u32>().unwrap_or_default()
    }

    /// Count in the bin at `coords`.
    pub fn at(&self, coords: &[usize]) -> Result<u32> {
        Ok(self.data.get_f64(coords)? as u32)
    }

    /// Total number of samples counted.
    pub fn count(&self) -> u64 {
        self.counts().iter().map(|&c| c as u64).sum()
    }

    /// Replace the counts by their cumulative sum over all axes.
    pub fn cumulative(&mut self) -> Result<&mut Self> {
        let sizes = self.data.sizes().clone();
        let mut values: Vec<f64> = self.data.to_vec::<f64>()?;
        let strides = crate::image::normal_strides(&sizes, 1);
        for dim in 0..sizes.len() {
            let stride = strides[dim] as usize;
            for i in 0..values.len() {
                if (i / stride) % sizes[dim] != 0 {
                    values[i] += values[i - stride];
                }
            }
        }
        self.set_counts(&sizes, &values)?;
        Ok(self)
    }

    /// 1-D histogram of the counts summed over all axes except `dim`.
    pub fn marginal(&self, dim: usize) -> Result<Histogram> {
        if dim >= self.dimensionality() {
            return Err(Error::InvalidParameter(format!(
                "dimension {dim} out of range for a {}-D histogram",
                self.dimensionality()
            )));
        }
        let sizes = self.data.sizes();
        let stride = crate::image::normal_strides(sizes, 1)[dim] as usize;
        let mut counts = vec![0u32; sizes[dim]];
        for (i, c) in self.counts().into_iter().enumerate() {
            let bin = (i / stride) % sizes[dim];
            counts[bin] = counts[bin].saturating_add(c);
        }
        Histogram::from_counts(counts, self.lower_bounds[dim], self.bin_sizes[dim])
    }

    /// Gaussian smoothing with standard deviation `sigma` (in bins). The
    /// histogram is first padded on both sides of every axis by the
    /// kernel radius, and the lower bounds moved accordingly, so that no
    /// mass is lost at the edges. Smoothed counts are rounded.
    pub fn smooth(&mut self, sigma: f64) -> Result<&mut Self> {
        if sigma.is_nan() || sigma < 0.0 {
            return Err(Error::InvalidParameter(format!("invalid sigma {sigma}")));
        }
        if sigma == 0.0 {
            return Ok(self);
        }
        let radius = (sigma * SMOOTH_TRUNCATION).ceil() as usize;
        let kernel = gaussian_kernel(sigma, radius);

        let old_sizes = self.data.sizes().clone();
        let sizes: UnsignedArray = old_sizes.as_slice().iter().map(|&s| s + 2 * radius).collect();
        let old_strides = crate::image::normal_strides(&old_sizes, 1);
        let strides = crate::image::normal_strides(&sizes, 1);
        let mut values = vec![0.0; sizes.product()];
        for (i, c) in self.counts().into_iter().enumerate() {
            let mut index = 0;
            for dim in 0..old_sizes.len() {
                let coord = (i / old_strides[dim] as usize) % old_sizes[dim];
                index += (coord + radius) * strides[dim] as usize;
            }
            values[index] = c as f64;
        }
        for dim in 0..sizes.len() {
            values = convolve_along(&values, &sizes, strides[dim] as usize, dim, &kernel);
            self.lower_bounds[dim] -= radius as f64 * self.bin_sizes[dim];
        }
        self.set_counts(&sizes, &values)?;
        Ok(self)
    }

    fn set_counts(&mut self, sizes: &[usize], values: &[f64]) -> Result<()> {
        let counts = values
            .iter()
            .map(|&v| v.round().clamp(0.0, u32::MAX as f64) as u32)
            .collect();
        self.data = Image::from_vec(sizes, counts)?;
        Ok(())
    }
}

/// Normalised Gaussian sampled at `-radius..=radius`.
fn gaussian_kernel(sigma: f64, radius: usize) -> Vec<f64> {
    let r = radius as isize;
    let mut kernel: Vec<f64> = (-r..=r)
        .map(|x| (-(x * x) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Convolve every line along `dim` with `kernel`, zeros beyond the edges.
fn convolve_along(
    values: &[f64],
    sizes: &[usize],
    stride: usize,
    dim: usize,
    kernel: &[f64],
) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;
    let len = sizes[dim] as isize;
    let mut out = vec![0.0; values.len()];
    for (i, o) in out.iter_mut().enumerate() {
        let pos = ((i / stride) % sizes[dim]) as isize;
        let line_start = i - pos as usize * stride;
        *o = kernel
            .iter()
            .enumerate()
            .filter_map(|(k, &w)| {
                let p = pos + k as isize - radius;
                (0..len)
                    .contains(&p)
                    .then(|| w * values[line_start + p as usize * stride])
            })
            .sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_float_image_histogram() {
        let img = Image::from_vec(&[1], vec![0.0f32]).unwrap();
        let hist = Histogram::from_image(&img, None, &HistogramConfiguration::default()).unwrap();
        assert_eq!(hist.dimensionality(), 1);
        assert_eq!(hist.bins(0), 256);
        assert_eq!(hist.bin_size(0), 1.0 / 256.0);
        assert_eq!(hist.lower_bound(0), 0.0);
        assert_eq!(hist.upper_bound(0), 1.0);
        assert_eq!(hist.count(), 1);
        assert_eq!(hist.at(&[0]).unwrap(), 1);
        assert_eq!(hist.at(&[1]).unwrap(), 0);
    }

    #[test]
    fn test_uint8_bins_are_centred_on_integers() {
        let img = Image::from_vec(&[3], vec![0u8, 128, 255]).unwrap();
        let hist = Histogram::from_image(&img, None, &HistogramConfiguration::default()).unwrap();
        assert_eq!(hist.lower_bound(0), -0.5);
        assert_eq!(hist.bin_size(0), 1.0);
        assert_eq!(hist.bin_center(128), 128.0);
        assert_eq!(hist.at(&[255]).unwrap(), 1);
        assert_eq!(hist.bin_boundaries().len(), 257);
    }

    #[test]
    fn test_uint16_power_of_two_bins() {
        let img = Image::from_vec(&[2], vec![0u16, 1000]).unwrap();
        let hist = Histogram::from_image(&img, None, &HistogramConfiguration::default()).unwrap();
        assert_eq!(hist.bin_size(0), 4.0);
        assert_eq!(hist.bins(0), 251);
        assert_eq!(hist.count(), 2);
    }

    #[test]
    fn test_mask_and_out_of_bounds() {
        let img = Image::from_vec(&[4], vec![1.0f64, 2.0, 3.0, 50.0]).unwrap();
        let mask = Image::from_vec(&[4], vec![true, true, false, true]).unwrap();
        let config = HistogramConfiguration::new(0.0, 10.0, 10);
        let hist = Histogram::from_image(&img, Some(&mask), &config).unwrap();
        assert_eq!(hist.count(), 3);
        assert_eq!(hist.at(&[9]).unwrap(), 1);
        let config = config.with_exclude_out_of_bound_values(true);
        let hist = Histogram::from_image(&img, Some(&mask), &config).unwrap();
        assert_eq!(hist.count(), 2);
    }

    #[test]
    fn test_joint_histogram_and_marginal() {
        let img = Image::from_tensor_vec(
            &[3],
            crate::Tensor::vector(2).unwrap(),
            vec![0u8, 1, 0, 2, 1, 2],
        )
        .unwrap();
        let hist = Histogram::from_image(&img, None, &HistogramConfiguration::default()).unwrap();
        assert_eq!(hist.dimensionality(), 2);
        assert_eq!(hist.at(&[0, 1]).unwrap(), 1);
        assert_eq!(hist.at(&[0, 2]).unwrap(), 1);
        assert_eq!(hist.at(&[1, 2]).unwrap(), 1);
        let first = hist.marginal(0).unwrap();
        assert_eq!(first.counts()[..2], [2, 1]);
        let second = hist.marginal(1).unwrap();
        assert_eq!(second.counts()[..3], [0, 1, 2]);
    }

    #[test]
    fn test_cumulative() {
        let mut hist = Histogram::from_counts(vec![1, 0, 2, 3], 0.0, 1.0).unwrap();
        hist.cumulative().unwrap();
        assert_eq!(hist.counts(), vec![1, 1, 3, 6]);
    }

    #[test]
    fn test_smooth_pads_and_preserves_mass() {
        let mut counts = vec![0u32; 11];
        counts[5] = 1000;
        let mut hist = Histogram::from_counts(counts, 0.0, 2.0).unwrap();
        hist.smooth(1.0).unwrap();
        assert_eq!(hist.bins(0), 17);
        assert_eq!(hist.lower_bound(0), -6.0);
        let c = hist.counts();
        assert_eq!(c[8], c.iter().copied().max().unwrap());
        assert_eq!(c[7], c[9]);
        let total = hist.count() as i64;
        assert!((total - 1000).abs() <= 3);
        assert!(hist.smooth(-1.0).is_err());
    }
}
