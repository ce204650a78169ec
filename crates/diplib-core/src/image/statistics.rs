//! Whole-image sample statistics
//!
//! Reductions over all samples of a real image, optionally restricted to
//! the pixels selected by a binary mask of the same sizes.

use super::Image;
use crate::error::{Error, Result};

impl Image {
    /// Real sample values of the pixels selected by `mask` (all pixels if
    /// `None`), tensor elements innermost.
    pub fn masked_values(&self, mask: Option<&Image>) -> Result<Vec<f64>> {
        self.require_forged()?;
        if self.data_type().is_complex() {
            return Err(Error::DataTypeNotSupported(self.data_type()));
        }
        match mask {
            None => self.to_vec::<f64>(),
            Some(mask) => self.at_mask(mask)?.copy().and_then(|img| {
                if img.is_forged() {
                    img.to_vec::<f64>()
                } else {
                    Ok(Vec::new())
                }
            }),
        }
    }

    /// Smallest and largest sample value, as `(min, max)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the mask selects no pixels.
    pub fn maximum_and_minimum(&self, mask: Option<&Image>) -> Result<(f64, f64)> {
        let values = self.masked_values(mask)?;
        if values.is_empty() {
            return Err(Error::InvalidParameter("no pixels selected".into()));
        }
        Ok(values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }))
    }

    /// Sum of all sample values.
    pub fn sum(&self, mask: Option<&Image>) -> Result<f64> {
        Ok(self.masked_values(mask)?.iter().sum())
    }

    /// Mean sample value; 0 if no pixels are selected.
    pub fn mean(&self, mask: Option<&Image>) -> Result<f64> {
        let values = self.masked_values(mask)?;
        if values.is_empty() {
            return Ok(0.0);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Number of non-zero samples.
    pub fn count(&self, mask: Option<&Image>) -> Result<usize> {
        Ok(self
            .masked_values(mask)?
            .iter()
            .filter(|&&v| v != 0.0)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics() {
        let img = Image::from_vec(&[4], vec![3i8, -2, 0, 7]).unwrap();
        assert_eq!(img.maximum_and_minimum(None).unwrap(), (-2.0, 7.0));
        assert_eq!(img.sum(None).unwrap(), 8.0);
        assert_eq!(img.mean(None).unwrap(), 2.0);
        assert_eq!(img.count(None).unwrap(), 3);
        let mask = Image::from_vec(&[4], vec![true, false, true, false]).unwrap();
        assert_eq!(img.maximum_and_minimum(Some(&mask)).unwrap(), (0.0, 3.0));
        let none = Image::from_vec(&[4], vec![false; 4]).unwrap();
        assert!(img.maximum_and_minimum(Some(&none)).is_err());
        assert_eq!(img.mean(Some(&none)).unwrap(), 0.0);
    }
}
