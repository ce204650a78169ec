//! Geometry manipulation without copying
//!
//! Every method here changes only the handle: sizes, strides, tensor
//! shape and origin. The samples are not touched and the storage stays
//! shared with any other handle.

use super::Image;
use crate::error::{Error, Result};
use crate::tensor::Tensor;
use crate::UnsignedArray;

/// Sizes resulting from singleton expansion of two size arrays.
///
/// The shorter array is padded with trailing ones. Along each dimension the
/// sizes must be equal, or one of them must be 1.
///
/// # Examples
///
/// ```
/// use diplib_core::singleton_expanded_sizes;
///
/// let s = singleton_expanded_sizes(&[5, 1, 3], &[1, 4]).unwrap();
/// assert_eq!(s.as_slice(), &[5, 4, 3]);
/// assert!(singleton_expanded_sizes(&[5], &[4]).is_err());
/// ```
pub fn singleton_expanded_sizes(a: &[usize], b: &[usize]) -> Result<UnsignedArray> {
    let n = a.len().max(b.len());
    let mut out = UnsignedArray::new();
    for d in 0..n {
        let sa = a.get(d).copied().unwrap_or(1);
        let sb = b.get(d).copied().unwrap_or(1);
        let s = if sa == sb || sb == 1 {
            sa
        } else if sa == 1 {
            sb
        } else {
            return Err(Error::sizes_dont_match(a, b));
        };
        out.push(s);
    }
    Ok(out)
}

impl Image {
    /// Reverse the direction of the dimensions for which `axes` is true.
    pub fn mirror(&mut self, axes: &[bool]) -> Result<&mut Self> {
        self.require_forged()?;
        if axes.len() != self.dimensionality() {
            return Err(Error::ArrayParameterWrongLength {
                expected: self.dimensionality(),
                actual: axes.len(),
            });
        }
        let mut origin = self.origin as isize;
        for (d, &flip) in axes.iter().enumerate() {
            if flip {
                origin += (self.sizes[d] as isize - 1) * self.strides[d];
                self.strides[d] = -self.strides[d];
            }
        }
        self.origin = origin as usize;
        Ok(self)
    }

    /// Reorder dimensions: new dimension `i` is old dimension `order[i]`.
    ///
    /// Old dimensions missing from `order` must be singletons; they are
    /// dropped.
    pub fn permute_dimensions(&mut self, order: &[usize]) -> Result<&mut Self> {
        self.require_forged()?;
        let n = self.dimensionality();
        let mut seen = vec![false; n];
        for &o in order {
            if o >= n || seen[o] {
                return Err(Error::InvalidParameter(format!(
                    "invalid dimension order {order:?}"
                )));
            }
            seen[o] = true;
        }
        if let Some(d) = (0..n).find(|&d| !seen[d] && self.sizes[d] != 1) {
            return Err(Error::InvalidParameter(format!(
                "dimension {d} is not a singleton and cannot be dropped"
            )));
        }
        self.sizes = self.sizes.permute(order);
        self.strides = self.strides.permute(order);
        self.pixel_size.permute(order);
        Ok(self)
    }

    /// Swap two dimensions.
    pub fn swap_dimensions(&mut self, d1: usize, d2: usize) -> Result<&mut Self> {
        let mut order: Vec<usize> = (0..self.dimensionality()).collect();
        if d1 >= order.len() || d2 >= order.len() {
            return Err(Error::IndexOutOfRange {
                index: d1.max(d2) as isize,
                len: order.len(),
            });
        }
        order.swap(d1, d2);
        self.permute_dimensions(&order)
    }

    /// Flatten to one dimension. Copies only if the samples are not evenly
    /// spaced in storage.
    pub fn flatten(&mut self) -> Result<&mut Self> {
        self.require_forged()?;
        let n = self.number_of_pixels();
        let order = self.strides.sorted_indices();
        let mut expected = self.tensor_elements() as isize;
        let simple_layout = self.tensor_stride == 1
            && order.iter().all(|&d| {
                let ok = self.sizes[d] == 1 || self.strides[d] == expected;
                expected *= self.sizes[d] as isize;
                ok
            });
        if !simple_layout {
            *self = self.copy()?;
        }
        let order = self.strides.sorted_indices();
        let start = order
            .iter()
            .find(|&&d| self.sizes[d] > 1)
            .map_or(self.tensor_elements() as isize, |&d| self.strides[d]);
        self.sizes = UnsignedArray::from_slice(&[n]);
        self.strides = [start].into();
        self.pixel_size.resize(1);
        Ok(self)
    }

    /// Remove all singleton dimensions.
    pub fn squeeze(&mut self) -> Result<&mut Self> {
        self.require_forged()?;
        let mut d = 0;
        while d < self.sizes.len() {
            if self.sizes[d] == 1 {
                self.sizes.erase(d);
                self.strides.erase(d);
                self.pixel_size.erase(d);
            } else {
                d += 1;
            }
        }
        Ok(self)
    }

    /// Insert a singleton dimension at `dim`.
    pub fn add_singleton(&mut self, dim: usize) -> Result<&mut Self> {
        self.require_forged()?;
        if dim > self.dimensionality() {
            return Err(Error::IndexOutOfRange {
                index: dim as isize,
                len: self.dimensionality(),
            });
        }
        self.sizes.insert(dim, 1);
        self.strides.insert(dim, 0);
        self.pixel_size.insert(dim);
        Ok(self)
    }

    /// Append singleton dimensions up to `n_dims` dimensions.
    pub fn expand_dimensionality(&mut self, n_dims: usize) -> Result<&mut Self> {
        self.require_forged()?;
        while self.dimensionality() < n_dims {
            let d = self.dimensionality();
            self.add_singleton(d)?;
        }
        Ok(self)
    }

    /// Repeat singleton dimension `dim` to `size` pixels using a zero
    /// stride.
    pub fn expand_singleton_dimension(&mut self, dim: usize, size: usize) -> Result<&mut Self> {
        self.require_forged()?;
        if dim >= self.dimensionality() {
            return Err(Error::IndexOutOfRange {
                index: dim as isize,
                len: self.dimensionality(),
            });
        }
        if self.sizes[dim] != 1 {
            return Err(Error::InvalidParameter(format!(
                "dimension {dim} is not a singleton"
            )));
        }
        self.sizes[dim] = size;
        self.strides[dim] = 0;
        Ok(self)
    }

    /// Singleton-expand to `sizes`, adding trailing dimensions as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizesDontMatch`] if a non-singleton dimension
    /// differs from the target.
    pub fn expand_singleton_to(&mut self, sizes: &[usize]) -> Result<&mut Self> {
        self.require_forged()?;
        if self.dimensionality() > sizes.len() {
            return Err(Error::sizes_dont_match(&self.sizes, sizes));
        }
        let target = singleton_expanded_sizes(&self.sizes, sizes)?;
        if target.as_slice() != sizes {
            return Err(Error::sizes_dont_match(&self.sizes, sizes));
        }
        self.expand_dimensionality(sizes.len())?;
        for (d, &n) in sizes.iter().enumerate() {
            if self.sizes[d] != n {
                self.expand_singleton_dimension(d, n)?;
            }
        }
        Ok(self)
    }

    /// Repeat the single tensor element `n` times using a zero tensor
    /// stride.
    pub fn expand_singleton_tensor(&mut self, n: usize) -> Result<&mut Self> {
        self.require_forged()?;
        if self.tensor_elements() != 1 {
            return Err(Error::NTensorElemDontMatch(1, self.tensor_elements()));
        }
        self.tensor = Tensor::vector(n)?;
        self.tensor_stride = 0;
        Ok(self)
    }

    /// Make the tensor a new spatial dimension inserted at `dim`. The image
    /// becomes scalar.
    pub fn tensor_to_spatial(&mut self, dim: usize) -> Result<&mut Self> {
        self.require_forged()?;
        if dim > self.dimensionality() {
            return Err(Error::IndexOutOfRange {
                index: dim as isize,
                len: self.dimensionality(),
            });
        }
        self.sizes.insert(dim, self.tensor_elements());
        self.strides.insert(dim, self.tensor_stride);
        self.pixel_size.insert(dim);
        self.tensor = Tensor::scalar();
        self.tensor_stride = 1;
        Ok(self)
    }

    /// Make spatial dimension `dim` of a scalar image the tensor, as a
    /// column vector.
    pub fn spatial_to_tensor(&mut self, dim: usize) -> Result<&mut Self> {
        self.require_forged()?;
        if !self.is_scalar() {
            return Err(Error::ImageNotScalar);
        }
        if dim >= self.dimensionality() {
            return Err(Error::IndexOutOfRange {
                index: dim as isize,
                len: self.dimensionality(),
            });
        }
        self.tensor = Tensor::vector(self.sizes[dim])?;
        self.tensor_stride = self.strides[dim];
        self.sizes.erase(dim);
        self.strides.erase(dim);
        self.pixel_size.erase(dim);
        Ok(self)
    }

    /// Scalar view of tensor element `index`.
    pub fn tensor_element(&self, index: usize) -> Result<Image> {
        self.require_forged()?;
        if index >= self.tensor_elements() {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                len: self.tensor_elements(),
            });
        }
        let mut out = self.clone();
        out.origin = (self.origin as isize + index as isize * self.tensor_stride) as usize;
        out.tensor = Tensor::scalar();
        out.tensor_stride = 1;
        out.color_space.clear();
        Ok(out)
    }

    /// View of the diagonal of a matrix tensor, as a vector.
    pub fn diagonal(&self) -> Result<Image> {
        self.require_forged()?;
        let mut out = self.clone();
        let mut stride = self.tensor_stride;
        out.tensor.extract_diagonal(&mut stride);
        out.tensor_stride = stride;
        Ok(out)
    }

    /// Transpose the tensor (no samples move).
    pub fn transpose(&mut self) -> &mut Self {
        self.tensor.transpose();
        self
    }
}
