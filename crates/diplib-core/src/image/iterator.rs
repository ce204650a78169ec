//! Pixel iteration
//!
//! All iteration visits pixels in linear index order: dimension 0 varies
//! fastest. Strides may be negative (mirrored views) or zero (singleton
//! expanded dimensions).

use super::{Image, PixelRef};
use crate::{IntegerArray, UnsignedArray};

/// Walks the buffer offsets of all pixels of a strided geometry.
#[derive(Debug, Clone)]
pub(crate) struct OffsetWalker {
    sizes: UnsignedArray,
    strides: IntegerArray,
    coords: UnsignedArray,
    offset: isize,
    remaining: usize,
}

impl OffsetWalker {
    pub(crate) fn new(sizes: &UnsignedArray, strides: &IntegerArray, origin: usize) -> Self {
        OffsetWalker {
            sizes: sizes.clone(),
            strides: strides.clone(),
            coords: UnsignedArray::filled(sizes.len(), 0),
            offset: origin as isize,
            remaining: sizes.iter().product(),
        }
    }

    /// Coordinates of the pixel the next call to `next` returns.
    pub(crate) fn coordinates(&self) -> &UnsignedArray {
        &self.coords
    }
}

impl Iterator for OffsetWalker {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let out = self.offset as usize;
        if self.remaining > 0 {
            for d in 0..self.sizes.len() {
                self.coords[d] += 1;
                self.offset += self.strides[d];
                if self.coords[d] < self.sizes[d] {
                    break;
                }
                self.offset -= self.strides[d] * self.sizes[d] as isize;
                self.coords[d] = 0;
            }
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for OffsetWalker {}

/// Iterator over the pixels of an image, yielding [`PixelRef`]s.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
///
/// let img = Image::from_vec(&[2, 2], vec![1u8, 2, 3, 4]).unwrap();
/// let sum: f64 = img.iter().unwrap().map(|p| p.get_f64(0).unwrap()).sum();
/// assert_eq!(sum, 10.0);
/// ```
pub struct ImageIterator<'a> {
    image: &'a Image,
    walker: OffsetWalker,
}

impl<'a> ImageIterator<'a> {
    pub(crate) fn new(image: &'a Image) -> Self {
        ImageIterator {
            image,
            walker: image.pixel_offsets(),
        }
    }
}

impl<'a> Iterator for ImageIterator<'a> {
    type Item = PixelRef<'a>;

    fn next(&mut self) -> Option<PixelRef<'a>> {
        let offset = self.walker.next()?;
        Some(PixelRef::new(self.image, offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walker.size_hint()
    }
}

/// Iterator over the pixels of an image together with their coordinates.
pub struct IndexedImageIterator<'a> {
    image: &'a Image,
    walker: OffsetWalker,
}

impl<'a> IndexedImageIterator<'a> {
    pub(crate) fn new(image: &'a Image) -> Self {
        IndexedImageIterator {
            image,
            walker: image.pixel_offsets(),
        }
    }
}

impl<'a> Iterator for IndexedImageIterator<'a> {
    type Item = (UnsignedArray, PixelRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let coords = self.walker.coordinates().clone();
        let offset = self.walker.next()?;
        Some((coords, PixelRef::new(self.image, offset)))
    }
}
