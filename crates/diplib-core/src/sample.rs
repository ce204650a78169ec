//! Dynamically typed sample and pixel values
//!
//! A [`Sample`] is a single value of any [`DataType`]; a [`Pixel`] is a
//! tensor of samples sharing one data type. Both are plain values: reading
//! them from an image copies, and writing them converts to the image's
//! data type.

use std::fmt;

use num_complex::{Complex32, Complex64};

use crate::datatype::{DataType, SampleType};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// A single sample value tagged with its data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Bin(bool),
    UInt8(u8),
    SInt8(i8),
    UInt16(u16),
    SInt16(i16),
    UInt32(u32),
    SInt32(i32),
    SFloat(f32),
    DFloat(f64),
    SComplex(Complex32),
    DComplex(Complex64),
}

/// Apply `$body` to the typed value inside a [`Sample`].
macro_rules! with_sample {
    ($sample:expr, $v:ident => $body:expr) => {
        match $sample {
            Sample::Bin($v) => $body,
            Sample::UInt8($v) => $body,
            Sample::SInt8($v) => $body,
            Sample::UInt16($v) => $body,
            Sample::SInt16($v) => $body,
            Sample::UInt32($v) => $body,
            Sample::SInt32($v) => $body,
            Sample::SFloat($v) => $body,
            Sample::DFloat($v) => $body,
            Sample::SComplex($v) => $body,
            Sample::DComplex($v) => $body,
        }
    };
}

impl Default for Sample {
    fn default() -> Self {
        Sample::SFloat(0.0)
    }
}

impl Sample {
    /// Wrap a typed value.
    pub fn new<T: SampleType>(value: T) -> Self {
        if T::DATA_TYPE.is_complex() {
            Sample::from_complex(value.to_complex(), T::DATA_TYPE)
        } else {
            Sample::from_f64(value.to_f64(), T::DATA_TYPE)
        }
    }

    /// Data type of the value.
    pub fn data_type(&self) -> DataType {
        match self {
            Sample::Bin(_) => DataType::Bin,
            Sample::UInt8(_) => DataType::UInt8,
            Sample::SInt8(_) => DataType::SInt8,
            Sample::UInt16(_) => DataType::UInt16,
            Sample::SInt16(_) => DataType::SInt16,
            Sample::UInt32(_) => DataType::UInt32,
            Sample::SInt32(_) => DataType::SInt32,
            Sample::SFloat(_) => DataType::SFloat,
            Sample::DFloat(_) => DataType::DFloat,
            Sample::SComplex(_) => DataType::SComplex,
            Sample::DComplex(_) => DataType::DComplex,
        }
    }

    /// Value as a real number; complex values give their magnitude.
    pub fn as_f64(&self) -> f64 {
        with_sample!(*self, v => v.to_f64())
    }

    /// Value as a complex number.
    pub fn as_complex(&self) -> Complex64 {
        with_sample!(*self, v => v.to_complex())
    }

    /// Typed value, converted with clamping and truncation.
    pub fn as_type<T: SampleType>(&self) -> T {
        if self.data_type().is_complex() {
            T::from_complex(self.as_complex())
        } else {
            T::from_f64(self.as_f64())
        }
    }

    /// Sample of type `dt` holding the real value `v`.
    pub fn from_f64(v: f64, dt: DataType) -> Self {
        match dt {
            DataType::Bin => Sample::Bin(SampleType::from_f64(v)),
            DataType::UInt8 => Sample::UInt8(SampleType::from_f64(v)),
            DataType::SInt8 => Sample::SInt8(SampleType::from_f64(v)),
            DataType::UInt16 => Sample::UInt16(SampleType::from_f64(v)),
            DataType::SInt16 => Sample::SInt16(SampleType::from_f64(v)),
            DataType::UInt32 => Sample::UInt32(SampleType::from_f64(v)),
            DataType::SInt32 => Sample::SInt32(SampleType::from_f64(v)),
            DataType::SFloat => Sample::SFloat(SampleType::from_f64(v)),
            DataType::DFloat => Sample::DFloat(v),
            DataType::SComplex => Sample::SComplex(SampleType::from_f64(v)),
            DataType::DComplex => Sample::DComplex(SampleType::from_f64(v)),
        }
    }

    /// Sample of type `dt` holding the complex value `v`.
    pub fn from_complex(v: Complex64, dt: DataType) -> Self {
        match dt {
            DataType::Bin => Sample::Bin(SampleType::from_complex(v)),
            DataType::UInt8 => Sample::UInt8(SampleType::from_complex(v)),
            DataType::SInt8 => Sample::SInt8(SampleType::from_complex(v)),
            DataType::UInt16 => Sample::UInt16(SampleType::from_complex(v)),
            DataType::SInt16 => Sample::SInt16(SampleType::from_complex(v)),
            DataType::UInt32 => Sample::UInt32(SampleType::from_complex(v)),
            DataType::SInt32 => Sample::SInt32(SampleType::from_complex(v)),
            DataType::SFloat => Sample::SFloat(SampleType::from_complex(v)),
            DataType::DFloat => Sample::DFloat(SampleType::from_complex(v)),
            DataType::SComplex => Sample::SComplex(SampleType::from_complex(v)),
            DataType::DComplex => Sample::DComplex(v),
        }
    }

    /// The same value converted to `dt`.
    pub fn cast(&self, dt: DataType) -> Self {
        if self.data_type().is_complex() {
            Sample::from_complex(self.as_complex(), dt)
        } else {
            Sample::from_f64(self.as_f64(), dt)
        }
    }
}

macro_rules! impl_sample_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Sample {
                fn from(v: $t) -> Self {
                    Sample::$variant(v)
                }
            }
        )*
    };
}

impl_sample_from!(
    bool => Bin,
    u8 => UInt8,
    i8 => SInt8,
    u16 => UInt16,
    i16 => SInt16,
    u32 => UInt32,
    i32 => SInt32,
    f32 => SFloat,
    f64 => DFloat,
    Complex32 => SComplex,
    Complex64 => DComplex,
);

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_sample!(*self, v => write!(f, "{v}"))
    }
}

/// A tensor of samples, copied out of or destined for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    tensor: Tensor,
    samples: Vec<Sample>,
}

impl Pixel {
    /// Column-vector pixel from a list of samples, all converted to the
    /// type of the first one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for an empty list.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        let dt = samples
            .first()
            .map(Sample::data_type)
            .ok_or_else(|| Error::InvalidParameter("pixel needs at least one sample".into()))?;
        let tensor = Tensor::vector(samples.len())?;
        let samples = samples.into_iter().map(|s| s.cast(dt)).collect();
        Ok(Pixel { tensor, samples })
    }

    /// Pixel with a given tensor shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NTensorElemDontMatch`] if the number of samples
    /// differs from the tensor's element count.
    pub fn with_tensor(tensor: Tensor, samples: Vec<Sample>) -> Result<Self> {
        if tensor.elements() != samples.len() {
            return Err(Error::NTensorElemDontMatch(tensor.elements(), samples.len()));
        }
        let mut px = Pixel::new(samples)?;
        px.tensor = tensor;
        Ok(px)
    }

    /// Scalar pixel.
    pub fn scalar(sample: impl Into<Sample>) -> Self {
        Pixel {
            tensor: Tensor::scalar(),
            samples: vec![sample.into()],
        }
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn tensor_elements(&self) -> usize {
        self.samples.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.samples.len() == 1
    }

    pub fn data_type(&self) -> DataType {
        self.samples[0].data_type()
    }

    /// Tensor element `i`.
    pub fn get(&self, i: usize) -> Option<Sample> {
        self.samples.get(i).copied()
    }

    /// All samples in storage order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over the samples in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Convert every sample to `dt`.
    pub fn cast(&self, dt: DataType) -> Pixel {
        Pixel {
            tensor: self.tensor.clone(),
            samples: self.samples.iter().map(|s| s.cast(dt)).collect(),
        }
    }
}

impl From<Sample> for Pixel {
    fn from(s: Sample) -> Self {
        Pixel::scalar(s)
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [s] = self.samples.as_slice() {
            return write!(f, "{s}");
        }
        f.write_str("(")?;
        for (i, s) in self.samples.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{s}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_cast_saturates() {
        let s = Sample::from(-3.7f64);
        assert_eq!(s.cast(DataType::UInt8), Sample::UInt8(0));
        assert_eq!(s.cast(DataType::SInt16), Sample::SInt16(-3));
        assert_eq!(Sample::from(1000u16).cast(DataType::SInt8), Sample::SInt8(127));
        assert_eq!(Sample::from(0u8).cast(DataType::Bin), Sample::Bin(false));
    }

    #[test]
    fn test_complex_to_real_takes_magnitude() {
        let s = Sample::from(Complex64::new(-3.0, 4.0));
        assert_eq!(s.as_f64(), 5.0);
        assert_eq!(s.cast(DataType::UInt8), Sample::UInt8(5));
        assert_eq!(s.as_type::<Complex32>(), Complex32::new(-3.0, 4.0));
    }

    #[test]
    fn test_pixel_converts_to_first_type() {
        let px = Pixel::new(vec![Sample::from(1u8), Sample::from(300.0f32)]).unwrap();
        assert_eq!(px.data_type(), DataType::UInt8);
        assert_eq!(px.get(1), Some(Sample::UInt8(255)));
        assert_eq!(px.to_string(), "(1, 255)");
        assert!(Pixel::new(Vec::new()).is_err());
    }
}
