//! Pixel data types
//!
//! [`DataType`] is the closed set of sample types an [`Image`](crate::Image)
//! can hold. Kernels that must run on every type are written once, generic
//! over [`SampleType`], and dispatched at runtime on the `DataType` tag.
//!
//! Conversions between types clamp to the target range and truncate
//! fractional values toward zero. Complex values converted to a real type
//! yield their magnitude; binary values convert to 0 and 1, and any
//! non-zero value converts to `true`.

use std::fmt;
use std::str::FromStr;

use num_complex::{Complex32, Complex64};

use crate::error::{Error, Result};
use crate::image::SampleBuffer;

/// Sample data type of an image.
///
/// Variants are declared in promotion order: binary, then integers by
/// width (unsigned before signed), then floating-point, then complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DataType {
    /// Binary, one byte per sample
    Bin,
    /// 8-bit unsigned integer
    UInt8,
    /// 8-bit signed integer
    SInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 16-bit signed integer
    SInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 32-bit signed integer
    SInt32,
    /// Single-precision floating point
    #[default]
    SFloat,
    /// Double-precision floating point
    DFloat,
    /// Single-precision complex
    SComplex,
    /// Double-precision complex
    DComplex,
}

/// Data type of label images.
pub const DT_LABEL: DataType = DataType::UInt32;

impl DataType {
    /// All data types, in promotion order.
    pub const ALL: [DataType; 11] = [
        DataType::Bin,
        DataType::UInt8,
        DataType::SInt8,
        DataType::UInt16,
        DataType::SInt16,
        DataType::UInt32,
        DataType::SInt32,
        DataType::SFloat,
        DataType::DFloat,
        DataType::SComplex,
        DataType::DComplex,
    ];

    /// Whether the type is binary.
    pub fn is_binary(self) -> bool {
        self == DataType::Bin
    }

    /// Whether the type is an unsigned integer.
    pub fn is_uint(self) -> bool {
        matches!(self, DataType::UInt8 | DataType::UInt16 | DataType::UInt32)
    }

    /// Whether the type is a signed integer.
    pub fn is_sint(self) -> bool {
        matches!(self, DataType::SInt8 | DataType::SInt16 | DataType::SInt32)
    }

    /// Whether the type is an integer (signed or unsigned, not binary).
    pub fn is_integer(self) -> bool {
        self.is_uint() || self.is_sint()
    }

    /// Whether the type is real floating point.
    pub fn is_float(self) -> bool {
        matches!(self, DataType::SFloat | DataType::DFloat)
    }

    /// Whether the type is complex.
    pub fn is_complex(self) -> bool {
        matches!(self, DataType::SComplex | DataType::DComplex)
    }

    /// Whether the type is real (anything but complex, binary included).
    pub fn is_real(self) -> bool {
        !self.is_complex()
    }

    /// Whether the type can represent negative values.
    pub fn is_signed(self) -> bool {
        self.is_sint() || self.is_float() || self.is_complex()
    }

    /// Bytes per sample.
    pub fn size_of(self) -> usize {
        match self {
            DataType::Bin | DataType::UInt8 | DataType::SInt8 => 1,
            DataType::UInt16 | DataType::SInt16 => 2,
            DataType::UInt32 | DataType::SInt32 | DataType::SFloat => 4,
            DataType::DFloat | DataType::SComplex => 8,
            DataType::DComplex => 16,
        }
    }

    /// Short lowercase name, as used in flag strings.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Bin => "bin",
            DataType::UInt8 => "uint8",
            DataType::SInt8 => "sint8",
            DataType::UInt16 => "uint16",
            DataType::SInt16 => "sint16",
            DataType::UInt32 => "uint32",
            DataType::SInt32 => "sint32",
            DataType::SFloat => "sfloat",
            DataType::DFloat => "dfloat",
            DataType::SComplex => "scomplex",
            DataType::DComplex => "dcomplex",
        }
    }

    /// Smallest and largest finite value of a real type, as `f64`.
    ///
    /// Returns `None` for complex types.
    pub fn limits(self) -> Option<(f64, f64)> {
        Some(match self {
            DataType::Bin => (0.0, 1.0),
            DataType::UInt8 => (0.0, u8::MAX as f64),
            DataType::SInt8 => (i8::MIN as f64, i8::MAX as f64),
            DataType::UInt16 => (0.0, u16::MAX as f64),
            DataType::SInt16 => (i16::MIN as f64, i16::MAX as f64),
            DataType::UInt32 => (0.0, u32::MAX as f64),
            DataType::SInt32 => (i32::MIN as f64, i32::MAX as f64),
            DataType::SFloat => (f32::MIN as f64, f32::MAX as f64),
            DataType::DFloat => (f64::MIN, f64::MAX),
            DataType::SComplex | DataType::DComplex => return None,
        })
    }

    /// Floating-point type that can hold values of `self` without loss of
    /// the integer range: 32-bit integers and double types map to `DFloat`,
    /// everything else to `SFloat`.
    pub fn suggest_float(self) -> DataType {
        match self {
            DataType::UInt32 | DataType::SInt32 | DataType::DFloat | DataType::DComplex => {
                DataType::DFloat
            }
            _ => DataType::SFloat,
        }
    }

    /// Complex counterpart of [`suggest_float`](Self::suggest_float).
    pub fn suggest_complex(self) -> DataType {
        match self.suggest_float() {
            DataType::DFloat => DataType::DComplex,
            _ => DataType::SComplex,
        }
    }

    /// Like [`suggest_float`](Self::suggest_float), but complex types stay
    /// complex.
    pub fn suggest_flex(self) -> DataType {
        match self {
            DataType::SComplex | DataType::DComplex => self,
            _ => self.suggest_float(),
        }
    }

    /// Like [`suggest_flex`](Self::suggest_flex), but binary stays binary.
    pub fn suggest_flex_bin(self) -> DataType {
        match self {
            DataType::Bin => DataType::Bin,
            _ => self.suggest_flex(),
        }
    }

    /// Type for the result of arithmetic between samples of `a` and `b`.
    ///
    /// Binary with binary stays binary; otherwise the result is floating
    /// point, complex if either input is complex, and double precision if
    /// either input needs it.
    ///
    /// # Examples
    ///
    /// ```
    /// use diplib_core::DataType;
    ///
    /// assert_eq!(DataType::suggest_arithmetic(DataType::UInt8, DataType::UInt8), DataType::SFloat);
    /// assert_eq!(DataType::suggest_arithmetic(DataType::Bin, DataType::Bin), DataType::Bin);
    /// assert_eq!(DataType::suggest_arithmetic(DataType::SComplex, DataType::SInt32), DataType::DComplex);
    /// ```
    pub fn suggest_arithmetic(a: DataType, b: DataType) -> DataType {
        let (hi, lo) = {
            let a = a.suggest_flex_bin();
            let b = b.suggest_flex_bin();
            if a >= b { (a, b) } else { (b, a) }
        };
        match (hi, lo) {
            (DataType::DComplex, _) => DataType::DComplex,
            (DataType::SComplex, DataType::DFloat) => DataType::DComplex,
            (DataType::SComplex, _) => DataType::SComplex,
            (DataType::DFloat, _) => DataType::DFloat,
            (DataType::SFloat, _) => DataType::SFloat,
            _ => DataType::Bin,
        }
    }

    /// Type that can hold both `a` and `b` exactly, used for operations
    /// whose output has the input's range (min, max, selection).
    pub fn suggest_dyadic(a: DataType, b: DataType) -> DataType {
        use DataType::*;
        if a == b {
            return a;
        }
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        match (hi, lo) {
            (DComplex, _) => DComplex,
            (SComplex, DFloat) => DComplex,
            (SComplex, _) => SComplex,
            (DFloat, _) => DFloat,
            (SFloat, UInt32 | SInt32) => DFloat,
            (SFloat, _) => SFloat,
            (SInt32, UInt32) => DFloat,
            (SInt32, _) => SInt32,
            (UInt32, SInt16 | SInt8) => DFloat,
            (UInt32, _) => UInt32,
            (SInt16, UInt16) => SInt32,
            (SInt16, _) => SInt16,
            (UInt16, SInt8) => SInt32,
            (UInt16, _) => UInt16,
            (SInt8, UInt8) => SInt16,
            (SInt8, _) => SInt8,
            _ => UInt8,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DataType::ALL
            .iter()
            .copied()
            .find(|dt| dt.name() == s)
            .ok_or_else(|| Error::InvalidFlag(s.to_string()))
    }
}

/// A native Rust type that can be stored in an image.
///
/// Implemented for `bool`, `u8`, `i8`, `u16`, `i16`, `u32`, `i32`, `f32`,
/// `f64`, `Complex32` and `Complex64`.
pub trait SampleType: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The runtime tag for this type.
    const DATA_TYPE: DataType;

    /// Value as a real number (magnitude for complex types).
    fn to_f64(self) -> f64;

    /// Value as a complex number.
    fn to_complex(self) -> Complex64;

    /// Convert from a real number, clamping and truncating.
    fn from_f64(v: f64) -> Self;

    /// Convert from a complex number; real types take the magnitude.
    fn from_complex(v: Complex64) -> Self;

    /// Typed view of a buffer, if it holds this type.
    fn slice(buffer: &SampleBuffer) -> Option<&[Self]>;

    /// Mutable typed view of a buffer, if it holds this type.
    fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]>;

    /// Wrap a vector as a buffer.
    fn into_buffer(data: Vec<Self>) -> SampleBuffer;
}

macro_rules! impl_real_sample {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl SampleType for $t {
                const DATA_TYPE: DataType = DataType::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn to_complex(self) -> Complex64 {
                    Complex64::new(self as f64, 0.0)
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    // `as` saturates at the type limits, truncates, and maps NaN to 0
                    v as $t
                }

                #[inline]
                fn from_complex(v: Complex64) -> Self {
                    v.norm() as $t
                }

                fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
                    match buffer {
                        SampleBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
                    match buffer {
                        SampleBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_buffer(data: Vec<Self>) -> SampleBuffer {
                    SampleBuffer::$variant(data)
                }
            }
        )*
    };
}

impl_real_sample!(
    u8 => UInt8,
    i8 => SInt8,
    u16 => UInt16,
    i16 => SInt16,
    u32 => UInt32,
    i32 => SInt32,
    f32 => SFloat,
    f64 => DFloat,
);

impl SampleType for bool {
    const DATA_TYPE: DataType = DataType::Bin;

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn to_complex(self) -> Complex64 {
        Complex64::new(self.to_f64(), 0.0)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }

    #[inline]
    fn from_complex(v: Complex64) -> Self {
        v.re != 0.0 || v.im != 0.0
    }

    fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
        match buffer {
            SampleBuffer::Bin(v) => Some(v),
            _ => None,
        }
    }

    fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
        match buffer {
            SampleBuffer::Bin(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> SampleBuffer {
        SampleBuffer::Bin(data)
    }
}

macro_rules! impl_complex_sample {
    ($($t:ty => $variant:ident, $f:ty),* $(,)?) => {
        $(
            impl SampleType for $t {
                const DATA_TYPE: DataType = DataType::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self.norm() as f64
                }

                #[inline]
                fn to_complex(self) -> Complex64 {
                    Complex64::new(self.re as f64, self.im as f64)
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    <$t>::new(v as $f, 0.0)
                }

                #[inline]
                fn from_complex(v: Complex64) -> Self {
                    <$t>::new(v.re as $f, v.im as $f)
                }

                fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
                    match buffer {
                        SampleBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
                    match buffer {
                        SampleBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_buffer(data: Vec<Self>) -> SampleBuffer {
                    SampleBuffer::$variant(data)
                }
            }
        )*
    };
}

impl_complex_sample!(
    Complex32 => SComplex, f32,
    Complex64 => DComplex, f64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries() {
        assert!(DataType::Bin.is_binary());
        assert!(DataType::UInt16.is_uint());
        assert!(DataType::SInt8.is_sint());
        assert!(DataType::SInt32.is_integer());
        assert!(!DataType::Bin.is_integer());
        assert!(DataType::SFloat.is_float());
        assert!(DataType::DComplex.is_complex());
        assert!(DataType::Bin.is_real());
        assert!(!DataType::SComplex.is_real());
        assert_eq!(DataType::DComplex.size_of(), 16);
        assert_eq!(DataType::Bin.size_of(), 1);
    }

    #[test]
    fn test_suggest_float_and_complex() {
        assert_eq!(DataType::UInt8.suggest_float(), DataType::SFloat);
        assert_eq!(DataType::SInt32.suggest_float(), DataType::DFloat);
        assert_eq!(DataType::DComplex.suggest_float(), DataType::DFloat);
        assert_eq!(DataType::UInt16.suggest_complex(), DataType::SComplex);
        assert_eq!(DataType::UInt32.suggest_complex(), DataType::DComplex);
    }

    #[test]
    fn test_suggest_arithmetic_is_symmetric() {
        for &a in &DataType::ALL {
            for &b in &DataType::ALL {
                assert_eq!(
                    DataType::suggest_arithmetic(a, b),
                    DataType::suggest_arithmetic(b, a)
                );
            }
        }
        assert_eq!(
            DataType::suggest_arithmetic(DataType::Bin, DataType::UInt8),
            DataType::SFloat
        );
        assert_eq!(
            DataType::suggest_arithmetic(DataType::SComplex, DataType::SFloat),
            DataType::SComplex
        );
    }

    #[test]
    fn test_suggest_dyadic() {
        assert_eq!(
            DataType::suggest_dyadic(DataType::UInt8, DataType::SInt8),
            DataType::SInt16
        );
        assert_eq!(
            DataType::suggest_dyadic(DataType::UInt32, DataType::SInt32),
            DataType::DFloat
        );
        assert_eq!(
            DataType::suggest_dyadic(DataType::Bin, DataType::Bin),
            DataType::Bin
        );
    }

    #[test]
    fn test_saturating_conversion() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-5.0), 0);
        assert_eq!(u8::from_f64(3.9), 3);
        assert_eq!(i8::from_f64(-3.9), -3);
        assert_eq!(i16::from_f64(f64::NAN), 0);
        assert!(bool::from_f64(0.5));
        assert_eq!(f32::from_complex(Complex64::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_parse_name() {
        assert_eq!("uint16".parse::<DataType>().unwrap(), DataType::UInt16);
        assert!("uint64".parse::<DataType>().is_err());
    }
}
