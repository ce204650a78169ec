//! Pixel access and regular views
//!
//! Coordinates are given per dimension, dimension 0 first. Offsets are in
//! samples, relative to the image's first pixel; the linear index of a
//! pixel counts pixels with dimension 0 varying fastest.

use num_complex::Complex64;

use super::Image;
use crate::error::{Error, Result};
use crate::sample::{Pixel, Sample};
use crate::UnsignedArray;

/// An inclusive range of indices along one dimension.
///
/// Negative `start` and `stop` count from the end (`-1` is the last
/// index). If `start > stop` the range runs backwards, which mirrors the
/// view along that dimension.
///
/// # Examples
///
/// ```
/// use diplib_core::Range;
///
/// assert_eq!(Range::all().fix(5).unwrap(), (0, 5, 1));
/// assert_eq!(Range::new(-1, 0, 2).fix(5).unwrap(), (4, 3, -2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: isize,
    pub stop: isize,
    pub step: usize,
}

impl Default for Range {
    fn default() -> Self {
        Range::all()
    }
}

impl Range {
    pub fn new(start: isize, stop: isize, step: usize) -> Self {
        Range { start, stop, step }
    }

    /// The whole dimension.
    pub fn all() -> Self {
        Range::new(0, -1, 1)
    }

    /// A single index.
    pub fn single(index: isize) -> Self {
        Range::new(index, index, 1)
    }

    /// Resolve against a dimension of `size`, giving the first index, the
    /// number of indices, and the signed step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if an end point falls outside of
    /// the dimension, or [`Error::InvalidParameter`] for a zero step.
    pub fn fix(&self, size: usize) -> Result<(usize, usize, isize)> {
        if self.step == 0 {
            return Err(Error::InvalidParameter("range step must be positive".into()));
        }
        let resolve = |i: isize| -> Result<usize> {
            let j = if i < 0 { i + size as isize } else { i };
            if j < 0 || j as usize >= size {
                Err(Error::IndexOutOfRange { index: i, len: size })
            } else {
                Ok(j as usize)
            }
        };
        let start = resolve(self.start)?;
        let stop = resolve(self.stop)?;
        let step = self.step as isize;
        if start <= stop {
            Ok((start, (stop - start) / self.step + 1, step))
        } else {
            Ok((start, (start - stop) / self.step + 1, -step))
        }
    }
}

/// Where a crop window sits inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropLocation {
    /// The pixel at `size / 2` keeps its relative position
    #[default]
    Center,
    /// The pixel at `(size - 1) / 2` keeps its relative position
    MirrorCenter,
    TopLeft,
    BottomRight,
}

/// A reference to one pixel of an image.
///
/// Reads and writes go straight to the image's storage; writes convert to
/// the image's data type.
#[derive(Debug, Clone, Copy)]
pub struct PixelRef<'a> {
    image: &'a Image,
    offset: usize,
}

impl<'a> PixelRef<'a> {
    pub(crate) fn new(image: &'a Image, offset: usize) -> Self {
        PixelRef { image, offset }
    }

    fn sample_offset(&self, t: usize) -> Result<usize> {
        let n = self.image.tensor_elements();
        if t >= n {
            return Err(Error::IndexOutOfRange {
                index: t as isize,
                len: n,
            });
        }
        Ok((self.offset as isize + t as isize * self.image.tensor_stride()) as usize)
    }

    /// Copy of the whole pixel.
    pub fn get(&self) -> Result<Pixel> {
        let buf = self.image.read()?;
        let samples = (0..self.image.tensor_elements())
            .map(|t| self.sample_offset(t).map(|o| buf.get_sample(o)))
            .collect::<Result<Vec<_>>>()?;
        Pixel::with_tensor(*self.image.tensor(), samples)
    }

    /// Tensor element `t`.
    pub fn sample(&self, t: usize) -> Result<Sample> {
        let o = self.sample_offset(t)?;
        Ok(self.image.read()?.get_sample(o))
    }

    /// Tensor element `t` as a real number.
    pub fn get_f64(&self, t: usize) -> Result<f64> {
        let o = self.sample_offset(t)?;
        Ok(self.image.read()?.get_f64(o))
    }

    /// Tensor element `t` as a complex number.
    pub fn get_complex(&self, t: usize) -> Result<Complex64> {
        let o = self.sample_offset(t)?;
        Ok(self.image.read()?.get_complex(o))
    }

    /// Overwrite tensor element `t`.
    pub fn set_sample(&self, t: usize, value: impl Into<Sample>) -> Result<()> {
        let o = self.sample_offset(t)?;
        self.image.write()?.set_sample(o, value.into());
        Ok(())
    }

    /// Overwrite tensor element `t` with a real value.
    pub fn set_f64(&self, t: usize, value: f64) -> Result<()> {
        let o = self.sample_offset(t)?;
        self.image.write()?.set_f64(o, value);
        Ok(())
    }

    /// Overwrite the whole pixel; a scalar pixel fills all elements.
    pub fn set(&self, pixel: &Pixel) -> Result<()> {
        let n = self.image.tensor_elements();
        if pixel.tensor_elements() != n && !pixel.is_scalar() {
            return Err(Error::NTensorElemDontMatch(n, pixel.tensor_elements()));
        }
        let mut buf = self.image.write()?;
        for t in 0..n {
            let s = pixel.samples()[if pixel.is_scalar() { 0 } else { t }];
            buf.set_sample(self.sample_offset(t)?, s);
        }
        Ok(())
    }
}

impl Image {
    fn check_coordinates(&self, coords: &[usize]) -> Result<()> {
        if coords.len() != self.dimensionality() {
            return Err(Error::ArrayParameterWrongLength {
                expected: self.dimensionality(),
                actual: coords.len(),
            });
        }
        for (&c, &n) in coords.iter().zip(self.sizes().iter()) {
            if c >= n {
                return Err(Error::IndexOutOfRange {
                    index: c as isize,
                    len: n,
                });
            }
        }
        Ok(())
    }

    /// Offset of the pixel at `coords`, relative to the first pixel.
    pub fn offset(&self, coords: &[usize]) -> Result<isize> {
        self.require_forged()?;
        self.check_coordinates(coords)?;
        Ok(coords
            .iter()
            .zip(self.strides().iter())
            .map(|(&c, &s)| c as isize * s)
            .sum())
    }

    /// Linear index of the pixel at `coords`.
    pub fn index(&self, coords: &[usize]) -> Result<usize> {
        self.check_coordinates(coords)?;
        let mut index = 0;
        for d in (0..coords.len()).rev() {
            index = index * self.size(d) + coords[d];
        }
        Ok(index)
    }

    /// Coordinates of the pixel with linear index `index`.
    pub fn index_to_coordinates(&self, mut index: usize) -> Result<UnsignedArray> {
        let n = self.number_of_pixels();
        if index >= n {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                len: n,
            });
        }
        let mut coords = UnsignedArray::filled(self.dimensionality(), 0);
        for d in 0..self.dimensionality() {
            coords[d] = index % self.size(d);
            index /= self.size(d);
        }
        Ok(coords)
    }

    /// Coordinates of the pixel at `offset` (relative to the first pixel).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if a stride is zero or negative, or
    /// [`Error::IndexOutOfRange`] if the offset addresses no pixel.
    pub fn offset_to_coordinates(&self, offset: isize) -> Result<UnsignedArray> {
        self.require_forged()?;
        if self.strides().iter().any(|&s| s <= 0) {
            return Err(Error::NotSupported(
                "offset to coordinates needs positive strides".into(),
            ));
        }
        let order = self.strides().sorted_indices();
        let mut coords = UnsignedArray::filled(self.dimensionality(), 0);
        let mut rest = offset;
        for &d in order.iter().rev() {
            let s = self.stride(d);
            let c = rest / s;
            if rest < 0 || c as usize >= self.size(d) {
                return Err(Error::IndexOutOfRange {
                    index: offset,
                    len: self.number_of_samples(),
                });
            }
            coords[d] = c as usize;
            rest -= c * s;
        }
        if rest != 0 {
            return Err(Error::IndexOutOfRange {
                index: offset,
                len: self.number_of_samples(),
            });
        }
        Ok(coords)
    }

    /// Reference to the pixel at `coords`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotForged`], [`Error::ArrayParameterWrongLength`]
    /// or [`Error::IndexOutOfRange`].
    pub fn at(&self, coords: &[usize]) -> Result<PixelRef<'_>> {
        let offset = self.offset(coords)?;
        Ok(PixelRef::new(self, (self.origin as isize + offset) as usize))
    }

    /// Reference to the pixel with linear index `index`.
    pub fn at_index(&self, index: usize) -> Result<PixelRef<'_>> {
        let coords = self.index_to_coordinates(index)?;
        self.at(&coords)
    }

    /// First tensor element of the pixel at `coords` as a real number.
    pub fn get_f64(&self, coords: &[usize]) -> Result<f64> {
        self.at(coords)?.get_f64(0)
    }

    /// Set all tensor elements of the pixel at `coords` to `value`.
    pub fn set_f64(&self, coords: &[usize], value: f64) -> Result<()> {
        let px = self.at(coords)?;
        for t in 0..self.tensor_elements() {
            px.set_f64(t, value)?;
        }
        Ok(())
    }

    /// Copy of the pixel at `coords`.
    pub fn get_pixel(&self, coords: &[usize]) -> Result<Pixel> {
        self.at(coords)?.get()
    }

    /// Regular view selecting a range along each dimension. Shares storage
    /// with `self`.
    pub fn at_ranges(&self, ranges: &[Range]) -> Result<Image> {
        self.require_forged()?;
        if ranges.len() != self.dimensionality() {
            return Err(Error::ArrayParameterWrongLength {
                expected: self.dimensionality(),
                actual: ranges.len(),
            });
        }
        let mut out = self.clone();
        let mut origin = self.origin as isize;
        for (d, r) in ranges.iter().enumerate() {
            let (start, count, step) = r.fix(self.size(d))?;
            origin += start as isize * self.stride(d);
            out.sizes[d] = count;
            out.strides[d] = self.stride(d) * step;
        }
        out.origin = origin as usize;
        Ok(out)
    }

    /// Window of `sizes` placed according to `location`.
    pub fn crop_window(&self, sizes: &[usize], location: CropLocation) -> Result<Vec<Range>> {
        if sizes.len() != self.dimensionality() {
            return Err(Error::ArrayParameterWrongLength {
                expected: self.dimensionality(),
                actual: sizes.len(),
            });
        }
        let mut ranges = Vec::with_capacity(sizes.len());
        for (d, &n) in sizes.iter().enumerate() {
            let size = self.size(d);
            if n == 0 || n > size {
                return Err(Error::sizes_dont_match(self.sizes(), sizes));
            }
            let start = match location {
                CropLocation::Center => size / 2 - n / 2,
                CropLocation::MirrorCenter => (size - 1) / 2 - (n - 1) / 2,
                CropLocation::TopLeft => 0,
                CropLocation::BottomRight => size - n,
            };
            ranges.push(Range::new(start as isize, (start + n - 1) as isize, 1));
        }
        Ok(ranges)
    }

    /// Regular view of `sizes` pixels, placed according to `location`.
    ///
    /// # Examples
    ///
    /// ```
    /// use diplib_core::{CropLocation, DataType, Image};
    ///
    /// let img = Image::from_vec(&[5], vec![0u8, 1, 2, 3, 4]).unwrap();
    /// let c = img.crop(&[2], CropLocation::Center).unwrap();
    /// assert_eq!(c.to_vec::<u8>().unwrap(), vec![1, 2]);
    /// let c = img.crop(&[2], CropLocation::MirrorCenter).unwrap();
    /// assert_eq!(c.to_vec::<u8>().unwrap(), vec![2, 3]);
    /// ```
    pub fn crop(&self, sizes: &[usize], location: CropLocation) -> Result<Image> {
        let window = self.crop_window(sizes, location)?;
        self.at_ranges(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    fn ramp() -> Image {
        Image::from_vec(&[4, 3], (0..12u8).collect()).unwrap()
    }

    #[test]
    fn test_range_fix() {
        assert_eq!(Range::new(1, 3, 1).fix(5).unwrap(), (1, 3, 1));
        assert_eq!(Range::new(0, 4, 3).fix(5).unwrap(), (0, 2, 3));
        assert_eq!(Range::new(3, 1, 1).fix(5).unwrap(), (3, 3, -1));
        assert!(Range::new(0, 5, 1).fix(5).is_err());
        assert!(Range::new(-6, 0, 1).fix(5).is_err());
        assert!(Range::new(0, 1, 0).fix(5).is_err());
    }

    #[test]
    fn test_view_writes_reach_parent() {
        let img = ramp();
        let view = img
            .at_ranges(&[Range::new(1, 3, 2), Range::new(-1, 0, 1)])
            .unwrap();
        assert_eq!(view.sizes().as_slice(), &[2, 3]);
        assert_eq!(view.to_vec::<u8>().unwrap(), vec![9, 11, 5, 7, 1, 3]);
        view.set_f64(&[1, 0], 100.0).unwrap();
        assert_eq!(img.get_f64(&[3, 2]).unwrap(), 100.0);
    }

    #[test]
    fn test_index_and_coordinates() {
        let img = ramp();
        assert_eq!(img.index(&[1, 2]).unwrap(), 9);
        assert_eq!(img.index_to_coordinates(9).unwrap().as_slice(), &[1, 2]);
        assert_eq!(img.offset(&[1, 2]).unwrap(), 9);
        assert_eq!(img.offset_to_coordinates(9).unwrap().as_slice(), &[1, 2]);
        assert!(img.index(&[4, 0]).is_err());
        assert!(img.at(&[1]).is_err());
    }

    #[test]
    fn test_pixel_ref_tensor_access() {
        let img = Image::new(&[2], 3, DataType::SFloat).unwrap();
        let px = img.at(&[1]).unwrap();
        px.set_sample(2, 4.5f64).unwrap();
        assert_eq!(px.get_f64(2).unwrap(), 4.5);
        assert!(px.get_f64(3).is_err());
        let p = img.get_pixel(&[1]).unwrap();
        assert_eq!(p.tensor_elements(), 3);
        assert_eq!(p.get(2), Some(Sample::SFloat(4.5)));
    }
}
