//! Image - the multi-dimensional pixel container
//!
//! An [`Image`] is a handle to strided, tensor-valued sample storage. The
//! handle carries the geometry (sizes, strides, tensor shape, origin) and
//! metadata (data type, pixel size, color space); the samples live in a
//! reference-counted [`SampleBuffer`].
//!
//! # Forged and raw images
//!
//! A *raw* image has properties but no storage. [`Image::forge`] allocates
//! storage with normal strides: tensor elements are adjacent, dimension 0
//! (x) varies fastest. A *forged* image can be stripped again, or
//! re-forged with different properties.
//!
//! # Ownership model
//!
//! Cloning an `Image` is cheap and shares the storage, as does every
//! regular view ([`Image::at_ranges`], [`Image::crop`], mirroring,
//! permuting and the other geometry manipulations). Writing through any of
//! the handles is visible through all of them. [`Image::copy`] makes an
//! independent deep copy.
//!
//! Writes go through `&self`. Operations that read and write overlapping
//! storage read all input samples before writing any output sample, so
//! aliased arguments behave as if the input had been copied first.
//!
//! # Examples
//!
//! ```
//! use diplib_core::{DataType, Image, Range};
//!
//! let img = Image::new(&[4, 3], 1, DataType::UInt8).unwrap();
//! let row = img.at_ranges(&[Range::all(), Range::single(1)]).unwrap();
//! row.fill(7u8).unwrap();
//! assert_eq!(img.get_f64(&[2, 1]).unwrap(), 7.0);
//! assert_eq!(img.get_f64(&[2, 0]).unwrap(), 0.0);
//! ```

mod arith;
mod buffer;
mod indexing;
mod iterator;
mod manip;
mod statistics;
mod views;

pub use arith::{ArithOp, CompareOp};
pub(crate) use buffer::with_buffer;
pub use buffer::SampleBuffer;
pub use indexing::{CropLocation, PixelRef, Range};
pub use iterator::{ImageIterator, IndexedImageIterator};
pub use manip::singleton_expanded_sizes;
pub use views::View;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::datatype::{DataType, SampleType};
use crate::error::{Error, Result};
use crate::physical::PixelSize;
use crate::sample::{Pixel, Sample};
use crate::tensor::Tensor;
use crate::{IntegerArray, UnsignedArray};

use buffer::convert;
use iterator::OffsetWalker;

/// Multi-dimensional, tensor-valued image.
#[derive(Clone)]
pub struct Image {
    data_type: DataType,
    sizes: UnsignedArray,
    strides: IntegerArray,
    tensor: Tensor,
    tensor_stride: isize,
    origin: usize,
    storage: Option<Arc<RwLock<SampleBuffer>>>,
    color_space: String,
    pixel_size: PixelSize,
}

impl Default for Image {
    /// A raw scalar `SFloat` image with no dimensions.
    fn default() -> Self {
        Image {
            data_type: DataType::default(),
            sizes: UnsignedArray::new(),
            strides: IntegerArray::new(),
            tensor: Tensor::scalar(),
            tensor_stride: 0,
            origin: 0,
            storage: None,
            color_space: String::new(),
            pixel_size: PixelSize::default(),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("data_type", &self.data_type)
            .field("sizes", &self.sizes)
            .field("strides", &self.strides)
            .field("tensor", &self.tensor)
            .field("tensor_stride", &self.tensor_stride)
            .field("forged", &self.is_forged())
            .field("color_space", &self.color_space)
            .finish()
    }
}

/// Strides for a freshly allocated image: tensor elements adjacent, then
/// dimension 0, 1, ...
pub(crate) fn normal_strides(sizes: &[usize], tensor_elements: usize) -> IntegerArray {
    let mut strides = IntegerArray::new();
    let mut s = tensor_elements as isize;
    for &n in sizes {
        strides.push(s);
        s *= n as isize;
    }
    strides
}

fn sample_count(sizes: &[usize], tensor_elements: usize) -> Result<usize> {
    sizes
        .iter()
        .try_fold(tensor_elements, |acc, &n| acc.checked_mul(n))
        .ok_or(Error::AllocationFailed)
}

impl Image {
    /// Create a forged, zero-initialised image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `tensor_elements` is 0, or
    /// [`Error::AllocationFailed`] if the storage cannot be allocated.
    pub fn new(sizes: &[usize], tensor_elements: usize, data_type: DataType) -> Result<Image> {
        Image::with_tensor(sizes, Tensor::vector(tensor_elements)?, data_type)
    }

    /// Create a forged, zero-initialised image with a given tensor shape.
    pub fn with_tensor(sizes: &[usize], tensor: Tensor, data_type: DataType) -> Result<Image> {
        let mut img = Image {
            data_type,
            sizes: UnsignedArray::from_slice(sizes),
            tensor,
            ..Image::default()
        };
        img.forge()?;
        Ok(img)
    }

    /// A raw image with default properties. Same as `Image::default()`.
    pub fn raw() -> Image {
        Image::default()
    }

    /// A forged image with the same sizes, tensor, data type, pixel size
    /// and color space as `other`. The samples are zero.
    pub fn new_like(other: &Image) -> Result<Image> {
        Image::new_like_with_type(other, other.data_type)
    }

    /// Like [`new_like`](Self::new_like), with another data type.
    pub fn new_like_with_type(other: &Image, data_type: DataType) -> Result<Image> {
        let mut img = Image::with_tensor(&other.sizes, other.tensor, data_type)?;
        img.pixel_size = other.pixel_size.clone();
        img.color_space = other.color_space.clone();
        Ok(img)
    }

    /// Scalar image taking ownership of `data`, given in linear index order
    /// (dimension 0 fastest).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `data` does not hold exactly
    /// one sample per pixel.
    ///
    /// # Examples
    ///
    /// ```
    /// use diplib_core::Image;
    ///
    /// let img = Image::from_vec(&[3, 2], vec![1u8, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(img.get_f64(&[0, 1]).unwrap(), 4.0);
    /// assert_eq!(img.to_vec::<u8>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn from_vec<T: SampleType>(sizes: &[usize], data: Vec<T>) -> Result<Image> {
        Image::from_tensor_vec(sizes, Tensor::scalar(), data)
    }

    /// Tensor image taking ownership of `data`; the tensor elements of each
    /// pixel are adjacent.
    pub fn from_tensor_vec<T: SampleType>(
        sizes: &[usize],
        tensor: Tensor,
        data: Vec<T>,
    ) -> Result<Image> {
        let n = sample_count(sizes, tensor.elements())?;
        if data.len() != n {
            return Err(Error::InvalidParameter(format!(
                "expected {n} samples, got {}",
                data.len()
            )));
        }
        Ok(Image {
            data_type: T::DATA_TYPE,
            sizes: UnsignedArray::from_slice(sizes),
            strides: normal_strides(sizes, tensor.elements()),
            tensor,
            tensor_stride: 1,
            origin: 0,
            storage: Some(Arc::new(RwLock::new(T::into_buffer(data)))),
            ..Image::default()
        })
    }

    /// Wrap existing storage without copying.
    ///
    /// `strides`, `tensor_stride` and `origin` are in samples. Every
    /// sample addressed by the geometry must lie inside `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the geometry addresses samples
    /// outside of the buffer, or the array lengths disagree.
    pub fn from_buffer(
        buffer: SampleBuffer,
        sizes: &[usize],
        strides: &[isize],
        tensor: Tensor,
        tensor_stride: isize,
        origin: usize,
    ) -> Result<Image> {
        if sizes.len() != strides.len() {
            return Err(Error::ArrayParameterWrongLength {
                expected: sizes.len(),
                actual: strides.len(),
            });
        }
        let mut lo = origin as isize;
        let mut hi = origin as isize;
        let extents = sizes
            .iter()
            .zip(strides)
            .map(|(&n, &s)| (n, s))
            .chain(std::iter::once((tensor.elements(), tensor_stride)));
        for (n, s) in extents {
            if n == 0 {
                return Err(Error::InvalidParameter("sizes must be non-zero".into()));
            }
            let reach = (n as isize - 1) * s;
            if reach < 0 {
                lo += reach;
            } else {
                hi += reach;
            }
        }
        if lo < 0 || hi as usize >= buffer.len() {
            return Err(Error::InvalidParameter(
                "strides address samples outside of the buffer".into(),
            ));
        }
        Ok(Image {
            data_type: buffer.data_type(),
            sizes: UnsignedArray::from_slice(sizes),
            strides: IntegerArray::from_slice(strides),
            tensor,
            tensor_stride,
            origin,
            storage: Some(Arc::new(RwLock::new(buffer))),
            ..Image::default()
        })
    }

    /// A 0-dimensional image holding one pixel.
    pub fn from_pixel(pixel: &Pixel) -> Result<Image> {
        let img = Image::with_tensor(&[], *pixel.tensor(), pixel.data_type())?;
        img.fill_pixel(pixel)?;
        Ok(img)
    }

    /// A 0-dimensional scalar image holding one sample.
    pub fn from_sample(sample: impl Into<Sample>) -> Result<Image> {
        Image::from_pixel(&Pixel::scalar(sample))
    }

    // ---- Storage access ----

    fn storage(&self) -> Result<&Arc<RwLock<SampleBuffer>>> {
        self.storage.as_ref().ok_or(Error::ImageNotForged)
    }

    /// Read access to the whole storage buffer. The image's own samples
    /// are addressed through [`pixel_offsets`](Self::pixel_offsets).
    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, SampleBuffer>> {
        Ok(self
            .storage()?
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, SampleBuffer>> {
        Ok(self
            .storage()?
            .write()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Buffer offsets of the first sample of every pixel, in linear index
    /// order.
    pub(crate) fn pixel_offsets(&self) -> OffsetWalker {
        OffsetWalker::new(&self.sizes, &self.strides, self.origin)
    }

    /// Buffer offsets of every sample: pixels in linear index order, tensor
    /// elements innermost.
    pub(crate) fn sample_offsets(&self) -> impl Iterator<Item = usize> + use<> {
        let n_tensor = self.tensor.elements();
        let ts = self.tensor_stride;
        self.pixel_offsets()
            .flat_map(move |o| (0..n_tensor).map(move |t| (o as isize + t as isize * ts) as usize))
    }

    // ---- Forging ----

    /// Whether the image has storage.
    pub fn is_forged(&self) -> bool {
        self.storage.is_some()
    }

    fn require_raw(&self) -> Result<()> {
        if self.is_forged() {
            Err(Error::ImageNotRaw)
        } else {
            Ok(())
        }
    }

    pub(crate) fn require_forged(&self) -> Result<()> {
        if self.is_forged() {
            Ok(())
        } else {
            Err(Error::ImageNotForged)
        }
    }

    /// Set the sizes of a raw image.
    pub fn set_sizes(&mut self, sizes: &[usize]) -> Result<()> {
        self.require_raw()?;
        self.sizes = UnsignedArray::from_slice(sizes);
        Ok(())
    }

    /// Set the data type of a raw image.
    pub fn set_data_type(&mut self, data_type: DataType) -> Result<()> {
        self.require_raw()?;
        self.data_type = data_type;
        Ok(())
    }

    /// Make a raw image a column vector image with `n` elements.
    pub fn set_tensor_sizes(&mut self, n: usize) -> Result<()> {
        self.require_raw()?;
        self.tensor = Tensor::vector(n)?;
        Ok(())
    }

    /// Set the tensor shape. A forged image may change shape only if the
    /// number of elements stays the same.
    pub fn set_tensor(&mut self, tensor: Tensor) -> Result<()> {
        if self.is_forged() && tensor.elements() != self.tensor.elements() {
            return Err(Error::NTensorElemDontMatch(
                self.tensor.elements(),
                tensor.elements(),
            ));
        }
        self.tensor = tensor;
        Ok(())
    }

    pub fn set_pixel_size(&mut self, pixel_size: PixelSize) {
        self.pixel_size = pixel_size;
    }

    pub fn set_color_space(&mut self, color_space: impl Into<String>) {
        self.color_space = color_space.into();
    }

    /// Allocate storage for a raw image. Does nothing if already forged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a size is 0, or
    /// [`Error::AllocationFailed`].
    pub fn forge(&mut self) -> Result<()> {
        if self.is_forged() {
            return Ok(());
        }
        if self.sizes.contains(&0) {
            return Err(Error::InvalidParameter("image sizes must be non-zero".into()));
        }
        let n = sample_count(&self.sizes, self.tensor.elements())?;
        let buffer = SampleBuffer::zeros(self.data_type, n)?;
        self.strides = normal_strides(&self.sizes, self.tensor.elements());
        self.tensor_stride = 1;
        self.origin = 0;
        self.storage = Some(Arc::new(RwLock::new(buffer)));
        Ok(())
    }

    /// Release this handle's reference to the storage. Other handles
    /// sharing the storage keep it alive. Sizes, tensor and data type are
    /// kept.
    pub fn strip(&mut self) {
        self.storage = None;
        self.strides.clear();
        self.tensor_stride = 0;
        self.origin = 0;
    }

    /// Make the image forged with the given properties.
    ///
    /// An image that already has these properties is left untouched. An
    /// image whose storage is not shared with any other handle and holds
    /// the right number of samples of the right type keeps its storage
    /// (its samples are not cleared). Otherwise the image is stripped and
    /// forged anew. If forging fails, the image is left stripped.
    pub fn reforge(
        &mut self,
        sizes: &[usize],
        tensor_elements: usize,
        data_type: DataType,
    ) -> Result<()> {
        let tensor = match Tensor::vector(tensor_elements) {
            Ok(tensor) => tensor,
            Err(e) => {
                self.strip();
                return Err(e);
            }
        };
        if self.is_forged()
            && self.sizes.as_slice() == sizes
            && self.tensor.elements() == tensor_elements
            && self.data_type == data_type
        {
            return Ok(());
        }
        let n = match sample_count(sizes, tensor_elements) {
            Ok(n) => n,
            Err(e) => {
                self.strip();
                return Err(e);
            }
        };
        if let Some(storage) = &self.storage
            && Arc::strong_count(storage) == 1
            && self.data_type == data_type
        {
            let len = self.read()?.len();
            if len == n {
                self.sizes = UnsignedArray::from_slice(sizes);
                self.tensor = tensor;
                self.strides = normal_strides(sizes, tensor_elements);
                self.tensor_stride = 1;
                self.origin = 0;
                return Ok(());
            }
        }
        self.strip();
        self.sizes = UnsignedArray::from_slice(sizes);
        self.tensor = tensor;
        self.data_type = data_type;
        self.forge()
    }

    /// [`reforge`](Self::reforge) with the properties of `other`, which
    /// also copies its pixel size and color space.
    pub fn reforge_like(&mut self, other: &Image, data_type: DataType) -> Result<()> {
        self.reforge(&other.sizes, other.tensor.elements(), data_type)?;
        self.tensor = other.tensor;
        self.pixel_size = other.pixel_size.clone();
        self.color_space = other.color_space.clone();
        Ok(())
    }

    // ---- Properties ----

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Number of spatial dimensions.
    pub fn dimensionality(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &UnsignedArray {
        &self.sizes
    }

    /// Size along dimension `d`.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not a valid dimension.
    pub fn size(&self, d: usize) -> usize {
        self.sizes[d]
    }

    pub fn number_of_pixels(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn number_of_samples(&self) -> usize {
        self.number_of_pixels() * self.tensor.elements()
    }

    pub fn strides(&self) -> &IntegerArray {
        &self.strides
    }

    pub fn stride(&self, d: usize) -> isize {
        self.strides[d]
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn tensor_elements(&self) -> usize {
        self.tensor.elements()
    }

    pub fn tensor_stride(&self) -> isize {
        self.tensor_stride
    }

    pub fn is_scalar(&self) -> bool {
        self.tensor.is_scalar()
    }

    pub fn pixel_size(&self) -> &PixelSize {
        &self.pixel_size
    }

    pub fn color_space(&self) -> &str {
        &self.color_space
    }

    pub fn is_color(&self) -> bool {
        !self.color_space.is_empty()
    }

    /// Whether the strides are those [`forge`](Self::forge) would choose.
    pub fn has_normal_strides(&self) -> bool {
        self.is_forged()
            && self.tensor_stride == 1
            && self.strides == normal_strides(&self.sizes, self.tensor.elements())
    }

    /// Whether any dimension (or the tensor) has a zero stride and size
    /// above one.
    pub fn is_singleton_expanded(&self) -> bool {
        self.sizes.iter().zip(self.strides.iter()).any(|(&n, &s)| n > 1 && s == 0)
            || (self.tensor.elements() > 1 && self.tensor_stride == 0)
    }

    /// Whether both images point at the same storage.
    pub fn shares_data(&self, other: &Image) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether another handle shares this image's storage.
    pub fn is_shared(&self) -> bool {
        self.storage.as_ref().is_some_and(|s| Arc::strong_count(s) > 1)
    }

    /// Whether the two images have the same sizes, tensor elements and data
    /// type.
    pub fn compare_properties(&self, other: &Image) -> bool {
        self.sizes == other.sizes
            && self.tensor.elements() == other.tensor.elements()
            && self.data_type == other.data_type
    }

    // ---- Data ----

    /// All samples, in linear index order with tensor elements innermost,
    /// gathered into a new buffer of the image's data type.
    pub fn to_buffer(&self) -> Result<SampleBuffer> {
        let buf = self.read()?;
        Ok(buf.gather(self.sample_offsets()))
    }

    /// All samples converted to `T`, in linear index order with tensor
    /// elements innermost.
    pub fn to_vec<T: SampleType>(&self) -> Result<Vec<T>> {
        let buf = self.to_buffer()?;
        Ok(with_buffer!(&buf, v => v.iter().map(|&s| convert::<_, T>(s)).collect()))
    }

    /// Deep copy with normal strides.
    pub fn copy(&self) -> Result<Image> {
        let data = self.to_buffer()?;
        Ok(Image {
            data_type: self.data_type,
            sizes: self.sizes.clone(),
            strides: normal_strides(&self.sizes, self.tensor.elements()),
            tensor: self.tensor,
            tensor_stride: 1,
            origin: 0,
            storage: Some(Arc::new(RwLock::new(data))),
            color_space: self.color_space.clone(),
            pixel_size: self.pixel_size.clone(),
        })
    }

    /// Copy the samples of `src` into this image's storage, converting to
    /// this image's data type. `src` is singleton-expanded to this image's
    /// sizes and tensor elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizesDontMatch`] or [`Error::NTensorElemDontMatch`]
    /// if `src` cannot be expanded to this image.
    pub fn copy_from(&self, src: &Image) -> Result<()> {
        self.require_forged()?;
        let mut src = src.clone();
        src.expand_singleton_to(&self.sizes)?;
        if src.tensor.elements() != self.tensor.elements() {
            src.expand_singleton_tensor(self.tensor.elements())?;
        }
        // Read everything before taking the write lock: the two images may
        // share storage.
        let data = src.to_buffer()?;
        self.write()?.scatter(&data, self.sample_offsets());
        Ok(())
    }

    /// Copy converted to another data type.
    pub fn convert(&self, data_type: DataType) -> Result<Image> {
        let mut out = self.copy()?;
        out.convert_in_place(data_type)?;
        Ok(out)
    }

    /// Convert this handle to another data type. The image gets new
    /// storage with normal strides; other handles keep the old storage.
    pub fn convert_in_place(&mut self, data_type: DataType) -> Result<()> {
        if self.data_type == data_type {
            return Ok(());
        }
        let data = self.to_buffer()?.to_data_type(data_type)?;
        self.strides = normal_strides(&self.sizes, self.tensor.elements());
        self.tensor_stride = 1;
        self.origin = 0;
        self.data_type = data_type;
        self.storage = Some(Arc::new(RwLock::new(data)));
        Ok(())
    }

    /// Set every sample to `value`, converted to the image's data type.
    pub fn fill(&self, value: impl Into<Sample>) -> Result<()> {
        let value = value.into();
        let mut buf = self.write()?;
        for o in self.sample_offsets() {
            buf.set_sample(o, value);
        }
        Ok(())
    }

    /// Set every pixel to `pixel`. A scalar pixel fills all tensor
    /// elements.
    pub fn fill_pixel(&self, pixel: &Pixel) -> Result<()> {
        let n = self.tensor.elements();
        if pixel.tensor_elements() != n && !pixel.is_scalar() {
            return Err(Error::NTensorElemDontMatch(n, pixel.tensor_elements()));
        }
        let mut buf = self.write()?;
        for o in self.pixel_offsets() {
            for t in 0..n {
                let s = pixel.samples()[if pixel.is_scalar() { 0 } else { t }];
                buf.set_sample((o as isize + t as isize * self.tensor_stride) as usize, s);
            }
        }
        Ok(())
    }

    /// Iterate over all pixels in linear index order.
    pub fn iter(&self) -> Result<ImageIterator<'_>> {
        self.require_forged()?;
        Ok(ImageIterator::new(self))
    }

    /// Iterate over all pixels with their coordinates.
    pub fn indexed_iter(&self) -> Result<IndexedImageIterator<'_>> {
        self.require_forged()?;
        Ok(IndexedImageIterator::new(self))
    }
}
