//! Thresholding images
//!
//! Each estimator wrapper builds the histogram of a scalar image (within
//! an optional mask), picks a threshold with the matching function from
//! [`crate::histogram`], and returns the threshold together with the
//! binary image `in >= threshold`.

use diplib_core::{CompareOp, Error, Histogram, HistogramConfiguration, Image};
use log::debug;

use crate::error::SegmentResult;
use crate::histogram::{self, BackgroundOptions, TriangleOptions};

fn require_scalar(image: &Image) -> SegmentResult<()> {
    if !image.is_forged() {
        return Err(Error::ImageNotForged.into());
    }
    if !image.is_scalar() {
        return Err(Error::ImageNotScalar.into());
    }
    Ok(())
}

/// Histogram of `image` with the default bin layout: one bin per value for
/// 8-bit images, 256 bins over the sample range otherwise.
fn image_histogram(image: &Image, mask: Option<&Image>) -> SegmentResult<Histogram> {
    require_scalar(image)?;
    Ok(Histogram::from_image(
        image,
        mask,
        &HistogramConfiguration::default(),
    )?)
}

/// Binary image of the pixels of `image` that are at least `threshold`.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_segment::fixed_threshold;
///
/// let img = Image::from_vec(&[4], vec![10u8, 100, 150, 250]).unwrap();
/// let bin = fixed_threshold(&img, 120.0).unwrap();
/// assert_eq!(bin.to_vec::<u8>().unwrap(), vec![0, 0, 1, 1]);
/// ```
pub fn fixed_threshold(image: &Image, threshold: f64) -> SegmentResult<Image> {
    require_scalar(image)?;
    Ok(image.compare_constant(threshold, CompareOp::GreaterEqual)?)
}

/// Label image assigning each pixel the number of `thresholds` it reaches,
/// so `0` below the lowest threshold and `thresholds.len()` at or above the
/// highest. The thresholds need not be sorted.
pub fn multiple_thresholds(image: &Image, thresholds: &[f64]) -> SegmentResult<Image> {
    require_scalar(image)?;
    let mut sorted = thresholds.to_vec();
    sorted.sort_by(f64::total_cmp);
    let values = image.to_vec::<f64>()?;
    let classes = values.iter().map(|&v| sorted.partition_point(|&t| t <= v));
    let mut out = if sorted.len() <= u8::MAX as usize {
        Image::from_vec(image.sizes().as_slice(), classes.map(|c| c as u8).collect())?
    } else {
        Image::from_vec(image.sizes().as_slice(), classes.map(|c| c as u32).collect())?
    };
    out.set_pixel_size(image.pixel_size().clone());
    Ok(out)
}

/// Isodata thresholds of `image`. With one threshold the image output is
/// binary, with more it is a label image as made by
/// [`multiple_thresholds`].
pub fn isodata_threshold(
    image: &Image,
    mask: Option<&Image>,
    n_thresholds: usize,
) -> SegmentResult<(Vec<f64>, Image)> {
    let hist = image_histogram(image, mask)?;
    let thresholds = histogram::isodata_threshold(&hist, n_thresholds)?;
    let out = if let [threshold] = thresholds[..] {
        fixed_threshold(image, threshold)?
    } else {
        multiple_thresholds(image, &thresholds)?
    };
    Ok((thresholds, out))
}

/// Otsu threshold of `image` and the binary image it gives.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_segment::otsu_threshold;
///
/// let img = Image::from_vec(&[6], vec![20u8, 22, 21, 200, 201, 199]).unwrap();
/// let (t, bin) = otsu_threshold(&img, None).unwrap();
/// assert!(t > 22.0 && t < 199.0);
/// assert_eq!(bin.to_vec::<u8>().unwrap(), vec![0, 0, 0, 1, 1, 1]);
/// ```
pub fn otsu_threshold(image: &Image, mask: Option<&Image>) -> SegmentResult<(f64, Image)> {
    let hist = image_histogram(image, mask)?;
    let threshold = histogram::otsu_threshold(&hist)?;
    debug!("otsu_threshold on image: {}", threshold);
    Ok((threshold, fixed_threshold(image, threshold)?))
}

/// Minimum error threshold of `image` and the binary image it gives.
pub fn minimum_error_threshold(
    image: &Image,
    mask: Option<&Image>,
) -> SegmentResult<(f64, Image)> {
    let hist = image_histogram(image, mask)?;
    let threshold = histogram::minimum_error_threshold(&hist)?;
    Ok((threshold, fixed_threshold(image, threshold)?))
}

/// Triangle threshold of `image` and the binary image it gives.
pub fn triangle_threshold(
    image: &Image,
    mask: Option<&Image>,
    options: &TriangleOptions,
) -> SegmentResult<(f64, Image)> {
    let hist = image_histogram(image, mask)?;
    let threshold = histogram::triangle_threshold(&hist, options)?;
    Ok((threshold, fixed_threshold(image, threshold)?))
}

/// Background threshold of `image` and the binary image it gives.
pub fn background_threshold(
    image: &Image,
    mask: Option<&Image>,
    options: &BackgroundOptions,
) -> SegmentResult<(f64, Image)> {
    let hist = image_histogram(image, mask)?;
    let threshold = histogram::background_threshold(&hist, options)?;
    Ok((threshold, fixed_threshold(image, threshold)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentError;
    use diplib_core::DataType;

    #[test]
    fn test_fixed_threshold_rejects_tensor_images() {
        let img = Image::new(&[3], 2, DataType::UInt8).unwrap();
        assert!(matches!(
            fixed_threshold(&img, 1.0),
            Err(SegmentError::Core(Error::ImageNotScalar))
        ));
    }

    #[test]
    fn test_multiple_thresholds_counts_reached_thresholds() {
        let img = Image::from_vec(&[5], vec![0.0f32, 1.0, 2.5, 3.0, 9.0]).unwrap();
        let labels = multiple_thresholds(&img, &[3.0, 1.0]).unwrap();
        assert_eq!(labels.data_type(), DataType::UInt8);
        assert_eq!(labels.to_vec::<u8>().unwrap(), vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_isodata_on_image_with_mask() {
        let img = Image::from_vec(&[8], vec![10u8, 12, 11, 90, 91, 250, 250, 250]).unwrap();
        // the mask hides the bright pixels
        let mask = Image::from_vec(
            &[8],
            vec![true, true, true, true, true, false, false, false],
        )
        .unwrap();
        let (t, bin) = isodata_threshold(&img, Some(&mask), 1).unwrap();
        assert!(t[0] > 12.0 && t[0] < 90.0, "got {t:?}");
        assert_eq!(bin.to_vec::<u8>().unwrap(), vec![0, 0, 0, 1, 1, 1, 1, 1]);
    }
}
