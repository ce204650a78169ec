//! Threshold selection on 1-D histograms
//!
//! Every estimator takes a 1-D [`Histogram`] and returns thresholds in the
//! intensity units of the histogram, found by linear interpolation between
//! bin centres. A threshold `t` splits the data into `value < t` and
//! `value >= t`.

use diplib_core::{Error, Histogram};
use log::{debug, trace, warn};

use crate::error::{SegmentError, SegmentResult};

/// Isodata normally settles within a few dozen rounds; this stops it from
/// cycling between two states forever.
const MAX_ISODATA_ITERATIONS: usize = 1000;

/// HWHM of a Gaussian is this many sigma.
const HWHM_PER_SIGMA: f64 = 2.355 / 2.0;

/// Options for [`triangle_threshold`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleOptions {
    /// Standard deviation, in bins, of the smoothing applied to the
    /// histogram before the peak is located
    pub sigma: f64,
}

impl Default for TriangleOptions {
    fn default() -> Self {
        Self { sigma: 4.0 }
    }
}

impl TriangleOptions {
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}

/// Options for [`background_threshold`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundOptions {
    /// Distance from the background peak, in half widths at half maximum
    pub distance: f64,
    /// Standard deviation, in bins, of the smoothing applied to the
    /// histogram before the peak is located
    pub sigma: f64,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            distance: 2.0,
            sigma: 4.0,
        }
    }
}

impl BackgroundOptions {
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}

/// Counts of a 1-D histogram as floats.
fn counts_1d(hist: &Histogram) -> SegmentResult<Vec<f64>> {
    let n_dims = hist.dimensionality();
    if n_dims != 1 {
        return Err(Error::DimensionalityNotSupported(n_dims).into());
    }
    Ok(hist.counts().into_iter().map(f64::from).collect())
}

/// Intensity at fractional bin index `bin`, with bin centres at integers.
fn bin_to_value(hist: &Histogram, bin: f64) -> f64 {
    hist.lower_bound(0) + (bin + 0.5) * hist.bin_size(0)
}

/// Index of the first largest count.
fn peak(data: &[f64]) -> usize {
    data.iter()
        .enumerate()
        .fold((0, f64::MIN), |(best, max), (i, &v)| {
            if v > max { (i, v) } else { (best, max) }
        })
        .0
}

/// Centre of mass of the bins `begin..end`, or the middle of the interval
/// if it is empty.
fn center_of_mass(data: &[f64], begin: usize, end: usize) -> f64 {
    let (moment, sum) = data[begin..end]
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(m, s), (i, &c)| (m + (begin + i) as f64 * c, s + c));
    if sum > 0.0 {
        moment / sum
    } else {
        (begin + end) as f64 / 2.0
    }
}

/// Isodata (k-means) thresholds splitting the histogram into
/// `n_thresholds + 1` classes.
///
/// The thresholds start at the positions that divide the histogram mass
/// into equal parts. Each round then moves every threshold to the midpoint
/// between the centres of mass of the two classes next to it, until no
/// threshold moves.
///
/// # Examples
///
/// ```
/// use diplib_core::Histogram;
/// use diplib_segment::histogram::isodata_threshold;
///
/// let mut counts = vec![0u32; 256];
/// counts[50] = 100;
/// counts[200] = 100;
/// let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
/// assert_eq!(isodata_threshold(&hist, 1).unwrap(), vec![125.5]);
/// ```
pub fn isodata_threshold(hist: &Histogram, n_thresholds: usize) -> SegmentResult<Vec<f64>> {
    if n_thresholds == 0 {
        return Err(SegmentError::InvalidParameters(
            "isodata needs at least one threshold".into(),
        ));
    }
    let data = counts_1d(hist)?;
    let n_bins = data.len();
    if n_bins <= n_thresholds {
        return Err(SegmentError::DegenerateHistogram(format!(
            "{} bins cannot hold {} thresholds",
            n_bins, n_thresholds
        )));
    }
    let cumulative: Vec<f64> = data
        .iter()
        .scan(0.0, |acc, &c| {
            *acc += c;
            Some(*acc)
        })
        .collect();
    let total = cumulative[n_bins - 1];
    if total == 0.0 {
        return Err(SegmentError::DegenerateHistogram("histogram is empty".into()));
    }

    // equal-mass starting positions
    let per_class = (total / (n_thresholds + 1) as f64).floor();
    let mut thresholds = Vec::with_capacity(n_thresholds);
    let mut index = 1;
    for ii in 0..n_thresholds {
        while index < n_bins - 1 && cumulative[index] < per_class * (ii + 1) as f64 {
            index += 1;
        }
        thresholds.push(index as f64);
    }

    let mut iterations = 0;
    loop {
        let mut centers = Vec::with_capacity(n_thresholds + 1);
        let mut origin = 0;
        for ii in 0..=n_thresholds {
            let end = match thresholds.get(ii) {
                Some(&t) => (t.ceil() as usize).clamp(origin, n_bins),
                None => n_bins,
            };
            centers.push(center_of_mass(&data, origin, end));
            origin = end;
        }
        let updated: Vec<f64> = centers.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
        iterations += 1;
        trace!("isodata round {}: {:?}", iterations, updated);
        if updated == thresholds {
            break;
        }
        thresholds = updated;
        if iterations == MAX_ISODATA_ITERATIONS {
            warn!(
                "isodata_threshold: no convergence after {} iterations",
                MAX_ISODATA_ITERATIONS
            );
            break;
        }
    }

    let values: Vec<f64> = thresholds.iter().map(|&t| bin_to_value(hist, t)).collect();
    debug!(
        "isodata_threshold: {:?} after {} iterations",
        values, iterations
    );
    Ok(values)
}

/// Otsu's threshold, maximising the inter-class variance
/// `w1 * w2 * (c1 - c2)^2` over all splits between two bins.
///
/// When a range of consecutive splits attains the maximum (an empty stretch
/// between two modes), the threshold lies in the middle of that range.
///
/// # Errors
///
/// [`SegmentError::DegenerateHistogram`] if no split separates any mass,
/// as for a histogram with all counts in one bin.
pub fn otsu_threshold(hist: &Histogram) -> SegmentResult<f64> {
    let data = counts_1d(hist)?;
    let n_bins = data.len();

    let mut w1 = 0.0;
    let mut w2: f64 = data.iter().sum();
    let mut m1 = 0.0;
    let mut m2: f64 = data.iter().enumerate().map(|(i, &c)| i as f64 * c).sum();

    let mut best = 0.0;
    // first and last split of the run attaining `best`
    let mut best_range: Option<(usize, usize)> = None;
    for ii in 0..n_bins.saturating_sub(1) {
        let c = data[ii];
        w1 += c;
        w2 -= c;
        m1 += ii as f64 * c;
        m2 -= ii as f64 * c;
        let diff = m1 / w1 - m2 / w2;
        let ss = w1 * w2 * diff * diff;
        if ss > best {
            best = ss;
            best_range = Some((ii, ii));
            trace!("otsu: new maximum {} at bin {}", ss, ii);
        } else if ss == best
            && let Some((_, last)) = best_range.as_mut()
            && *last + 1 == ii
        {
            *last = ii;
        }
    }

    let Some((first, last)) = best_range else {
        return Err(SegmentError::DegenerateHistogram(
            "could not find a maximum in Otsu's measure for inter-class variance".into(),
        ));
    };
    let threshold = (hist.bin_center(first) + hist.bin_center(last + 1)) / 2.0;
    debug!("otsu_threshold: {}", threshold);
    Ok(threshold)
}

/// Kittler and Illingworth's minimum error threshold.
///
/// Both classes are modelled as Gaussians; the error measure
/// `1 + w1 ln v1 + w2 ln v2 - 2 (w1 ln w1 + w2 ln w2)` is computed for each
/// split and the lowest interior minimum is chosen. Monotone stretches at
/// either end of the measure are not considered, and splits where a class
/// has no spread are ignored.
///
/// # Errors
///
/// The histogram needs at least three bins, and at least one split must
/// have spread in both classes.
pub fn minimum_error_threshold(hist: &Histogram) -> SegmentResult<f64> {
    let data = counts_1d(hist)?;
    let n_bins = data.len();
    if n_bins < 3 {
        return Err(SegmentError::DegenerateHistogram(format!(
            "minimum error needs at least 3 bins, got {}",
            n_bins
        )));
    }
    let value = |i: usize| bin_to_value(hist, i as f64);

    // running zeroth, first and second moments of both halves
    let mut w1 = 0.0;
    let mut m1 = 0.0;
    let mut s1 = 0.0;
    let mut w2: f64 = data.iter().sum();
    let mut m2: f64 = data.iter().enumerate().map(|(i, &c)| c * value(i)).sum();
    let mut s2: f64 = data
        .iter()
        .enumerate()
        .map(|(i, &c)| c * value(i) * value(i))
        .sum();

    let mut j = Vec::with_capacity(n_bins - 1);
    for ii in 0..n_bins - 1 {
        let c = data[ii];
        let x = value(ii);
        w1 += c;
        w2 -= c;
        m1 += c * x;
        m2 -= c * x;
        s1 += c * x * x;
        s2 -= c * x * x;
        let c1 = m1 / w1;
        let c2 = m2 / w2;
        let v1 = s1 / w1 - c1 * c1;
        let v2 = s2 / w2 - c2 * c2;
        let measure = 1.0 + w1 * v1.ln() + w2 * v2.ln()
            - 2.0 * (w1 * w1.ln() + w2 * w2.ln());
        j.push(if measure.is_finite() {
            measure
        } else {
            f64::INFINITY
        });
    }

    // skip rising and falling stretches at the two ends
    let mut begin = 0;
    let mut end = n_bins - 2;
    while begin + 1 < end && j[begin] <= j[begin + 1] {
        begin += 1;
    }
    while begin + 1 < end && j[end] <= j[end - 1] {
        end -= 1;
    }
    let mut min_index = begin;
    for ii in begin + 1..end {
        if j[ii] < j[min_index] {
            min_index = ii;
        }
    }
    let min_j = j[min_index];
    if min_j == f64::INFINITY {
        return Err(SegmentError::DegenerateHistogram(
            "no split has spread in both classes".into(),
        ));
    }
    let mut max_index = min_index + 1;
    while max_index < end && j[max_index] == min_j {
        max_index += 1;
    }

    let threshold = bin_to_value(hist, (min_index + max_index) as f64 / 2.0);
    debug!("minimum_error_threshold: {}", threshold);
    Ok(threshold)
}

/// Distance from `p` to the line through `a` and `b`.
fn distance_to_line(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    cross.abs() / (b.0 - a.0).hypot(b.1 - a.1)
}

/// Zack's triangle (chord) threshold, for histograms with one dominant
/// peak and a long tail.
///
/// After smoothing, a chord is drawn from the peak to the far end bin on
/// each side. The threshold is the centre of the bin that lies furthest
/// from its chord.
pub fn triangle_threshold(hist: &Histogram, options: &TriangleOptions) -> SegmentResult<f64> {
    let mut smoothed = hist.clone();
    smoothed.smooth(options.sigma)?;
    let data = counts_1d(&smoothed)?;
    let n_bins = data.len();
    if n_bins < 3 {
        return Err(SegmentError::DegenerateHistogram(format!(
            "triangle needs at least 3 bins, got {}",
            n_bins
        )));
    }

    let top_bin = peak(&data);
    let top = (top_bin as f64, data[top_bin]);
    let left = (0.0, data[0]);
    let right = ((n_bins - 1) as f64, data[n_bins - 1]);

    let mut bin = 0;
    let mut max_distance = 0.0;
    let candidates = (1..top_bin)
        .map(|ii| (ii, left))
        .chain((top_bin + 1..n_bins - 1).map(|ii| (ii, right)));
    for (ii, end) in candidates {
        let d = distance_to_line(end, top, (ii as f64, data[ii]));
        if d > max_distance {
            max_distance = d;
            bin = ii;
        }
    }

    let threshold = smoothed.bin_center(bin);
    debug!(
        "triangle_threshold: {} (peak at bin {}, distance {})",
        threshold, top_bin, max_distance
    );
    Ok(threshold)
}

/// Peak position and height with sub-bin precision, from a parabola
/// through the logarithm of the three counts around `peak`.
fn subpixel_maximum(data: &[f64], peak: usize) -> (f64, f64) {
    let y0 = data[peak];
    if peak == 0 || peak + 1 >= data.len() {
        return (peak as f64, y0);
    }
    let (ym, yp) = (data[peak - 1], data[peak + 1]);
    if ym <= 0.0 || yp <= 0.0 || y0 <= 0.0 {
        return (peak as f64, y0);
    }
    let (a, b, c) = (ym.ln(), y0.ln(), yp.ln());
    let curvature = a - 2.0 * b + c;
    if curvature >= 0.0 {
        return (peak as f64, y0);
    }
    let offset = (a - c) / (2.0 * curvature);
    let height = (b - (c - a) * (c - a) / (8.0 * curvature)).exp();
    (peak as f64 + offset, height)
}

/// Threshold at a fixed distance from the background peak.
///
/// The histogram is smoothed and its maximum taken as the background peak.
/// Its half width at half maximum is measured on the side facing away
/// from the middle of the histogram, corrected for the smoothing, and the
/// threshold placed `distance` such widths from the peak towards the
/// middle.
///
/// # Errors
///
/// `distance` must be positive, and the histogram must not be empty.
pub fn background_threshold(hist: &Histogram, options: &BackgroundOptions) -> SegmentResult<f64> {
    if options.distance.is_nan() || options.distance <= 0.0 {
        return Err(SegmentError::InvalidParameters(format!(
            "background distance must be positive, got {}",
            options.distance
        )));
    }
    let mut smoothed = hist.clone();
    smoothed.smooth(options.sigma)?;
    let data = counts_1d(&smoothed)?;
    let n_bins = data.len();

    let top_bin = peak(&data);
    if data[top_bin] <= 0.0 {
        return Err(SegmentError::DegenerateHistogram("histogram is empty".into()));
    }
    let (peak_position, peak_height) = subpixel_maximum(&data, top_bin);
    let half_max = peak_height / 2.0;
    let right_peak = top_bin > n_bins / 2;

    // last bin above half maximum walking outward from the peak
    let outward = |bin: usize| {
        if right_peak {
            (bin + 1 < n_bins).then_some(bin + 1)
        } else {
            bin.checked_sub(1)
        }
    };
    let mut bin = top_bin;
    while let Some(next) = outward(bin)
        && data[next] > half_max
    {
        bin = next;
    }
    let subsample = match outward(bin) {
        Some(next) if data[bin] > half_max => (data[bin] - half_max) / (data[bin] - data[next]),
        _ => 0.0,
    };
    let observed_hwhm = if right_peak {
        bin as f64 + subsample - peak_position
    } else {
        peak_position - (bin as f64 - subsample)
    };

    // widths add in quadrature under Gaussian smoothing
    let smoothing_hwhm = options.sigma * HWHM_PER_SIGMA;
    let true_hwhm = if observed_hwhm > smoothing_hwhm {
        (observed_hwhm * observed_hwhm - smoothing_hwhm * smoothing_hwhm).sqrt()
    } else {
        0.0
    }
    .max(1.0);

    let peak_location = bin_to_value(&smoothed, peak_position);
    let sign = if right_peak { -1.0 } else { 1.0 };
    let threshold = peak_location + sign * true_hwhm * options.distance * smoothed.bin_size(0);
    debug!(
        "background_threshold: {} (peak at {}, HWHM {} bins)",
        threshold, peak_location, true_hwhm
    );
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_spikes(a: usize, b: usize) -> Histogram {
        let mut counts = vec![0u32; 256];
        counts[a] = 500;
        counts[b] = 500;
        Histogram::from_counts(counts, 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_otsu_between_spikes() {
        let t = otsu_threshold(&two_spikes(50, 200)).unwrap();
        assert!(t > 125.0 && t < 126.0, "got {t}");
    }

    #[test]
    fn test_otsu_single_bin_is_degenerate() {
        let mut counts = vec![0u32; 16];
        counts[3] = 10;
        let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
        assert!(matches!(
            otsu_threshold(&hist),
            Err(SegmentError::DegenerateHistogram(_))
        ));
    }

    #[test]
    fn test_otsu_respects_bin_layout() {
        // same histogram with bins of size 2 starting at -10
        let mut counts = vec![0u32; 256];
        counts[50] = 500;
        counts[200] = 500;
        let hist = Histogram::from_counts(counts, -10.0, 2.0).unwrap();
        let t = otsu_threshold(&hist).unwrap();
        assert!((t - (-10.0 + 2.0 * 125.5)).abs() < 1e-9, "got {t}");
    }

    #[test]
    fn test_isodata_converges_between_spikes() {
        assert_eq!(isodata_threshold(&two_spikes(50, 200), 1).unwrap(), vec![125.5]);
        assert!(isodata_threshold(&two_spikes(50, 200), 0).is_err());
    }

    #[test]
    fn test_isodata_multiple_thresholds() {
        let counts = (0..256)
            .map(|i| {
                [30.0, 120.0, 220.0]
                    .iter()
                    .map(|m: &f64| 100.0 * (-(i as f64 - m).powi(2) / 128.0).exp())
                    .sum::<f64>()
                    .round() as u32
            })
            .collect();
        let hist = Histogram::from_counts(counts, 0.0, 1.0).unwrap();
        let t = isodata_threshold(&hist, 2).unwrap();
        assert_eq!(t.len(), 2);
        assert!((t[0] - 75.5).abs() < 0.01, "got {t:?}");
        assert!((t[1] - 170.5).abs() < 0.01, "got {t:?}");
    }

    #[test]
    fn test_minimum_error_needs_bins() {
        let hist = Histogram::from_counts(vec![3, 4], 0.0, 1.0).unwrap();
        assert!(minimum_error_threshold(&hist).is_err());
    }

    #[test]
    fn test_subpixel_maximum_of_sampled_gaussian() {
        let data: Vec<f64> = (0..9)
            .map(|i| 100.0 * (-(i as f64 - 4.3).powi(2) / 2.0).exp())
            .collect();
        let (pos, height) = subpixel_maximum(&data, 4);
        assert!((pos - 4.3).abs() < 1e-9);
        assert!((height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_background_rejects_bad_distance() {
        let options = BackgroundOptions::default().with_distance(0.0);
        assert!(matches!(
            background_threshold(&two_spikes(10, 20), &options),
            Err(SegmentError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_two_dimensional_histogram_rejected() {
        let joint = diplib_core::Image::new(&[2], 2, diplib_core::DataType::UInt8).unwrap();
        joint.fill(1u8).unwrap();
        let hist = Histogram::from_image(&joint, None, &Default::default()).unwrap();
        assert_eq!(hist.dimensionality(), 2);
        assert!(matches!(
            otsu_threshold(&hist),
            Err(SegmentError::Core(Error::DimensionalityNotSupported(2)))
        ));
    }
}
