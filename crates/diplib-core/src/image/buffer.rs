//! Typed sample storage
//!
//! [`SampleBuffer`] is the closed set of element vectors an image can own.
//! Kernels are written generic over [`SampleType`] and instantiated per
//! variant with the `with_buffer!` macro.

use num_complex::{Complex32, Complex64};

use crate::datatype::{DataType, SampleType};
use crate::error::{Error, Result};
use crate::sample::Sample;

/// Flat sample storage of one data type.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    Bin(Vec<bool>),
    UInt8(Vec<u8>),
    SInt8(Vec<i8>),
    UInt16(Vec<u16>),
    SInt16(Vec<i16>),
    UInt32(Vec<u32>),
    SInt32(Vec<i32>),
    SFloat(Vec<f32>),
    DFloat(Vec<f64>),
    SComplex(Vec<Complex32>),
    DComplex(Vec<Complex64>),
}

/// Bind the typed vector inside a [`SampleBuffer`] to `$v` and evaluate
/// `$body` once per variant.
macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            SampleBuffer::Bin($v) => $body,
            SampleBuffer::UInt8($v) => $body,
            SampleBuffer::SInt8($v) => $body,
            SampleBuffer::UInt16($v) => $body,
            SampleBuffer::SInt16($v) => $body,
            SampleBuffer::UInt32($v) => $body,
            SampleBuffer::SInt32($v) => $body,
            SampleBuffer::SFloat($v) => $body,
            SampleBuffer::DFloat($v) => $body,
            SampleBuffer::SComplex($v) => $body,
            SampleBuffer::DComplex($v) => $body,
        }
    };
}
pub(crate) use with_buffer;

fn try_zeroed<T: SampleType>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::AllocationFailed)?;
    v.resize(len, T::default());
    Ok(v)
}

/// Convert one sample between types: complex sources keep their phase
/// when the destination is complex, and give their magnitude otherwise.
#[inline]
pub(crate) fn convert<S: SampleType, D: SampleType>(s: S) -> D {
    if S::DATA_TYPE.is_complex() {
        D::from_complex(s.to_complex())
    } else {
        D::from_f64(s.to_f64())
    }
}

impl SampleBuffer {
    /// Zero-initialised buffer of `len` samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be reserved.
    pub fn zeros(data_type: DataType, len: usize) -> Result<Self> {
        Ok(match data_type {
            DataType::Bin => SampleBuffer::Bin(try_zeroed(len)?),
            DataType::UInt8 => SampleBuffer::UInt8(try_zeroed(len)?),
            DataType::SInt8 => SampleBuffer::SInt8(try_zeroed(len)?),
            DataType::UInt16 => SampleBuffer::UInt16(try_zeroed(len)?),
            DataType::SInt16 => SampleBuffer::SInt16(try_zeroed(len)?),
            DataType::UInt32 => SampleBuffer::UInt32(try_zeroed(len)?),
            DataType::SInt32 => SampleBuffer::SInt32(try_zeroed(len)?),
            DataType::SFloat => SampleBuffer::SFloat(try_zeroed(len)?),
            DataType::DFloat => SampleBuffer::DFloat(try_zeroed(len)?),
            DataType::SComplex => SampleBuffer::SComplex(try_zeroed(len)?),
            DataType::DComplex => SampleBuffer::DComplex(try_zeroed(len)?),
        })
    }

    /// Data type of the stored samples.
    pub fn data_type(&self) -> DataType {
        match self {
            SampleBuffer::Bin(_) => DataType::Bin,
            SampleBuffer::UInt8(_) => DataType::UInt8,
            SampleBuffer::SInt8(_) => DataType::SInt8,
            SampleBuffer::UInt16(_) => DataType::UInt16,
            SampleBuffer::SInt16(_) => DataType::SInt16,
            SampleBuffer::UInt32(_) => DataType::UInt32,
            SampleBuffer::SInt32(_) => DataType::SInt32,
            SampleBuffer::SFloat(_) => DataType::SFloat,
            SampleBuffer::DFloat(_) => DataType::DFloat,
            SampleBuffer::SComplex(_) => DataType::SComplex,
            SampleBuffer::DComplex(_) => DataType::DComplex,
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `i` as a real number.
    #[inline]
    pub fn get_f64(&self, i: usize) -> f64 {
        with_buffer!(self, v => v[i].to_f64())
    }

    /// Sample `i` as a complex number.
    #[inline]
    pub fn get_complex(&self, i: usize) -> Complex64 {
        with_buffer!(self, v => v[i].to_complex())
    }

    /// Sample `i` as a tagged value.
    pub fn get_sample(&self, i: usize) -> Sample {
        with_buffer!(self, v => Sample::new(v[i]))
    }

    /// Overwrite sample `i` with a real value, clamping and truncating.
    #[inline]
    pub fn set_f64(&mut self, i: usize, value: f64) {
        with_buffer!(self, v => v[i] = SampleType::from_f64(value))
    }

    /// Overwrite sample `i` with a complex value.
    #[inline]
    pub fn set_complex(&mut self, i: usize, value: Complex64) {
        with_buffer!(self, v => v[i] = SampleType::from_complex(value))
    }

    /// Overwrite sample `i` with a tagged value, converting it.
    pub fn set_sample(&mut self, i: usize, value: Sample) {
        with_buffer!(self, v => v[i] = value.as_type())
    }

    /// Gather the samples at `offsets` into a new buffer of the same type.
    pub(crate) fn gather(&self, offsets: impl Iterator<Item = usize>) -> SampleBuffer {
        with_buffer!(self, v => {
            SampleType::into_buffer(offsets.map(|o| v[o]).collect())
        })
    }

    /// Write `src` (read in order) to the samples at `offsets`, converting
    /// to this buffer's type. Stops at the shorter of the two.
    pub(crate) fn scatter(&mut self, src: &SampleBuffer, offsets: impl Iterator<Item = usize>) {
        with_buffer!(self, d => with_buffer!(src, s => {
            for (o, &value) in offsets.zip(s.iter()) {
                d[o] = convert(value);
            }
        }))
    }

    /// Same buffer converted to another data type.
    pub fn to_data_type(&self, data_type: DataType) -> Result<SampleBuffer> {
        if data_type == self.data_type() {
            return Ok(self.clone());
        }
        let mut out = SampleBuffer::zeros(data_type, self.len())?;
        out.scatter(self, 0..self.len());
        Ok(out)
    }
}
