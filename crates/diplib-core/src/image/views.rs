//! Views: regular and irregular pixel selections
//!
//! A [`View`] selects pixels of an image. A regular view is a strided
//! sub-image and shares storage; the irregular kinds (mask, offsets,
//! coordinates) keep a reference to the image plus the selection, and
//! produce a 1-D image when materialised with [`View::copy`].

use super::{Image, PixelRef, Range};
use crate::datatype::DataType;
use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::UnsignedArray;

/// A selection of pixels of an image.
#[derive(Debug, Clone)]
pub enum View {
    /// A strided sub-image sharing storage with its parent
    Regular(Image),
    /// Pixels where a binary mask of the same sizes is set
    Mask { image: Image, mask: Image },
    /// Pixels at offsets relative to the first pixel
    Offsets { image: Image, offsets: Vec<isize> },
    /// Pixels at the given coordinates
    Coordinates {
        image: Image,
        coordinates: Vec<UnsignedArray>,
    },
}

impl Image {
    /// Regular view over ranges; see [`Image::at_ranges`].
    pub fn view_ranges(&self, ranges: &[Range]) -> Result<View> {
        Ok(View::Regular(self.at_ranges(ranges)?))
    }

    /// View of the pixels selected by `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotBinary`] or [`Error::ImageNotScalar`] if the
    /// mask is not scalar binary, and [`Error::SizesDontMatch`] if its sizes
    /// differ from the image's.
    pub fn at_mask(&self, mask: &Image) -> Result<View> {
        self.require_forged()?;
        mask.require_forged()?;
        if !mask.is_scalar() {
            return Err(Error::ImageNotScalar);
        }
        if mask.data_type() != DataType::Bin {
            return Err(Error::ImageNotBinary);
        }
        if mask.sizes() != self.sizes() {
            return Err(Error::sizes_dont_match(self.sizes(), mask.sizes()));
        }
        Ok(View::Mask {
            image: self.clone(),
            mask: mask.clone(),
        })
    }

    /// View of the pixels at `offsets` (relative to the first pixel, as
    /// returned by [`Image::offset`]).
    pub fn at_offsets(&self, offsets: Vec<isize>) -> Result<View> {
        self.require_forged()?;
        for &o in &offsets {
            self.offset_to_coordinates(o)?;
        }
        Ok(View::Offsets {
            image: self.clone(),
            offsets,
        })
    }

    /// View of the pixels at `coordinates`.
    pub fn at_coordinates(&self, coordinates: Vec<UnsignedArray>) -> Result<View> {
        self.require_forged()?;
        for c in &coordinates {
            self.offset(c)?;
        }
        Ok(View::Coordinates {
            image: self.clone(),
            coordinates,
        })
    }
}

impl View {
    /// The image the view refers to.
    pub fn image(&self) -> &Image {
        match self {
            View::Regular(image)
            | View::Mask { image, .. }
            | View::Offsets { image, .. }
            | View::Coordinates { image, .. } => image,
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, View::Regular(_))
    }

    /// Buffer offsets of the first sample of every selected pixel.
    fn pixel_offsets(&self) -> Result<Vec<usize>> {
        let image = self.image();
        let origin = image.origin as isize;
        Ok(match self {
            View::Regular(image) => image.pixel_offsets().collect(),
            View::Mask { image, mask } => {
                let selected = mask.to_vec::<bool>()?;
                image
                    .pixel_offsets()
                    .zip(selected)
                    .filter_map(|(o, keep)| keep.then_some(o))
                    .collect()
            }
            View::Offsets { offsets, .. } => {
                offsets.iter().map(|&o| (origin + o) as usize).collect()
            }
            View::Coordinates { image, coordinates } => coordinates
                .iter()
                .map(|c| image.offset(c).map(|o| (origin + o) as usize))
                .collect::<Result<_>>()?,
        })
    }

    /// Number of selected pixels.
    pub fn number_of_pixels(&self) -> Result<usize> {
        Ok(match self {
            View::Regular(image) => image.number_of_pixels(),
            View::Offsets { offsets, .. } => offsets.len(),
            View::Coordinates { coordinates, .. } => coordinates.len(),
            View::Mask { mask, .. } => mask.to_vec::<bool>()?.into_iter().filter(|&b| b).count(),
        })
    }

    fn sample_offsets(&self) -> Result<Vec<usize>> {
        let image = self.image();
        let n = image.tensor_elements();
        let ts = image.tensor_stride();
        Ok(self
            .pixel_offsets()?
            .into_iter()
            .flat_map(|o| (0..n).map(move |t| (o as isize + t as isize * ts) as usize))
            .collect())
    }

    /// Materialise the selection. A regular view gives a deep copy of the
    /// sub-image; irregular views give a 1-D image with one pixel per
    /// selected pixel, in selection order.
    pub fn copy(&self) -> Result<Image> {
        if let View::Regular(image) = self {
            return image.copy();
        }
        let image = self.image();
        let offsets = self.sample_offsets()?;
        let data = image.read()?.gather(offsets.iter().copied());
        let n_pixels = offsets.len() / image.tensor_elements();
        if n_pixels == 0 {
            return Ok(Image::raw());
        }
        let mut out = Image::from_buffer(
            data,
            &[n_pixels],
            &[image.tensor_elements() as isize],
            *image.tensor(),
            1,
            0,
        )?;
        out.set_color_space(image.color_space());
        Ok(out)
    }

    /// Set every sample of the selected pixels to `value`.
    pub fn fill(&self, value: impl Into<Sample>) -> Result<()> {
        let value = value.into();
        let offsets = self.sample_offsets()?;
        let mut buf = self.image().write()?;
        for o in offsets {
            buf.set_sample(o, value);
        }
        Ok(())
    }

    /// Write the samples of `src` to the selected pixels, in selection
    /// order. `src` must have as many pixels as the selection and the same
    /// number of tensor elements; its sizes are otherwise ignored.
    pub fn copy_from(&self, src: &Image) -> Result<()> {
        let image = self.image();
        let offsets = self.sample_offsets()?;
        if src.tensor_elements() != image.tensor_elements() {
            return Err(Error::NTensorElemDontMatch(
                image.tensor_elements(),
                src.tensor_elements(),
            ));
        }
        if src.number_of_samples() != offsets.len() {
            return Err(Error::sizes_dont_match(
                &[offsets.len() / image.tensor_elements()],
                &[src.number_of_pixels()],
            ));
        }
        let data = src.to_buffer()?;
        image.write()?.scatter(&data, offsets.into_iter());
        Ok(())
    }

    /// References to the selected pixels, in selection order.
    pub fn iter(&self) -> Result<impl Iterator<Item = PixelRef<'_>>> {
        let image = self.image();
        Ok(self
            .pixel_offsets()?
            .into_iter()
            .map(move |o| PixelRef::new(image, o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_view_reads_and_writes() {
        let img = Image::from_vec(&[3, 2], vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let mask = Image::from_vec(&[3, 2], vec![true, false, true, false, true, false]).unwrap();
        let view = img.at_mask(&mask).unwrap();
        assert_eq!(view.number_of_pixels().unwrap(), 3);
        let values = view.copy().unwrap();
        assert_eq!(values.sizes().as_slice(), &[3]);
        assert_eq!(values.to_vec::<u8>().unwrap(), vec![1, 3, 5]);
        view.fill(0u8).unwrap();
        assert_eq!(img.to_vec::<u8>().unwrap(), vec![0, 2, 0, 4, 0, 6]);
    }

    #[test]
    fn test_mask_must_be_binary() {
        let img = Image::from_vec(&[2], vec![1u8, 2]).unwrap();
        let mask = Image::from_vec(&[2], vec![1u8, 0]).unwrap();
        assert!(matches!(img.at_mask(&mask), Err(Error::ImageNotBinary)));
    }

    #[test]
    fn test_coordinate_and_offset_views() {
        let img = Image::from_vec(&[3, 2], vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let coords = vec![
            UnsignedArray::from_slice(&[2, 1]),
            UnsignedArray::from_slice(&[0, 0]),
        ];
        let view = img.at_coordinates(coords).unwrap();
        assert_eq!(view.copy().unwrap().to_vec::<u8>().unwrap(), vec![6, 1]);
        let src = Image::from_vec(&[2], vec![60u8, 10]).unwrap();
        view.copy_from(&src).unwrap();
        assert_eq!(img.get_f64(&[2, 1]).unwrap(), 60.0);

        let view = img.at_offsets(vec![1, 4]).unwrap();
        assert_eq!(view.copy().unwrap().to_vec::<u8>().unwrap(), vec![2, 5]);
        assert!(img.at_offsets(vec![6]).is_err());
    }

    #[test]
    fn test_mask_on_tensor_image_selects_whole_pixels() {
        let img = Image::from_tensor_vec(
            &[2],
            crate::Tensor::vector(2).unwrap(),
            vec![1.0f32, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let mask = Image::from_vec(&[2], vec![false, true]).unwrap();
        let out = img.at_mask(&mask).unwrap().copy().unwrap();
        assert_eq!(out.tensor_elements(), 2);
        assert_eq!(out.to_vec::<f32>().unwrap(), vec![3.0, 4.0]);
    }
}
