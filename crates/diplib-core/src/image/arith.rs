//! Sample-wise arithmetic and comparison
//!
//! Binary operations between two images singleton-expand both operands to
//! a common size (see [`singleton_expanded_sizes`]) and a common number of
//! tensor elements. Results are computed in double precision (complex when
//! either operand or the output is complex) and converted to the output
//! data type, which clamps to the type's range. Binary images use logical
//! operations instead:
//!
//! | operation | binary meaning |
//! |-----------|----------------|
//! | add       | OR             |
//! | subtract  | AND NOT        |
//! | multiply  | AND            |
//! | divide    | OR NOT         |
//!
//! The default output type is [`DataType::suggest_arithmetic`] of the two
//! operand types. In-place variants keep the left operand's data type and
//! write into its storage when the output size matches it.
//!
//! # Examples
//!
//! ```
//! use diplib_core::{DataType, Image};
//!
//! let a = Image::from_vec(&[3], vec![100u8, 200, 250]).unwrap();
//! let b = Image::from_vec(&[1], vec![10u8]).unwrap();
//! let sum = a.add(&b).unwrap();
//! assert_eq!(sum.data_type(), DataType::SFloat);
//! let sat = a.arith(&b, diplib_core::ArithOp::Add, Some(DataType::UInt8)).unwrap();
//! assert_eq!(sat.to_vec::<u8>().unwrap(), vec![110, 210, 255]);
//! ```

use num_complex::Complex64;

use super::{singleton_expanded_sizes, Image, SampleBuffer};
use crate::datatype::DataType;
use crate::error::{Error, Result};
use crate::sample::Sample;

/// Sample-wise arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Division that yields 0 where the divisor is 0
    SafeDivide,
    /// Remainder of division; real types only
    Modulo,
}

impl ArithOp {
    fn real(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Subtract => a - b,
            ArithOp::Multiply => a * b,
            ArithOp::Divide => a / b,
            ArithOp::SafeDivide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            ArithOp::Modulo => a % b,
        }
    }

    fn complex(self, a: Complex64, b: Complex64) -> Complex64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Subtract => a - b,
            ArithOp::Multiply => a * b,
            ArithOp::Divide => a / b,
            ArithOp::SafeDivide => {
                if b == Complex64::new(0.0, 0.0) {
                    Complex64::new(0.0, 0.0)
                } else {
                    a / b
                }
            }
            // rejected before computing
            ArithOp::Modulo => Complex64::new(f64::NAN, 0.0),
        }
    }

    fn binary(self, a: bool, b: bool) -> bool {
        match self {
            ArithOp::Add => a || b,
            ArithOp::Subtract => a && !b,
            ArithOp::Multiply => a && b,
            ArithOp::Divide => a || !b,
            ArithOp::SafeDivide => a || !b,
            ArithOp::Modulo => a && !b,
        }
    }
}

/// Sample-wise comparison; the result is a binary image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl CompareOp {
    fn real(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Equal => a == b,
            CompareOp::NotEqual => a != b,
            CompareOp::Greater => a > b,
            CompareOp::GreaterEqual => a >= b,
            CompareOp::Lesser => a < b,
            CompareOp::LesserEqual => a <= b,
        }
    }
}

/// Both operands expanded to a common geometry, read into buffers.
struct Operands {
    sizes: Vec<usize>,
    tensor_elements: usize,
    lhs: SampleBuffer,
    rhs: SampleBuffer,
}

fn expand_operands(lhs: &Image, rhs: &Image) -> Result<Operands> {
    lhs.require_forged()?;
    rhs.require_forged()?;
    let sizes = singleton_expanded_sizes(lhs.sizes(), rhs.sizes())?;
    let (nl, nr) = (lhs.tensor_elements(), rhs.tensor_elements());
    let tensor_elements = match (nl, nr) {
        _ if nl == nr => nl,
        (1, _) => nr,
        (_, 1) => nl,
        _ => return Err(Error::NTensorElemDontMatch(nl, nr)),
    };
    let expand = |img: &Image| -> Result<SampleBuffer> {
        let mut img = img.clone();
        img.expand_singleton_to(&sizes)?;
        if img.tensor_elements() != tensor_elements {
            img.expand_singleton_tensor(tensor_elements)?;
        }
        img.to_buffer()
    };
    Ok(Operands {
        sizes: sizes.to_vec(),
        tensor_elements,
        lhs: expand(lhs)?,
        rhs: expand(rhs)?,
    })
}

/// Output image for a binary operation, with metadata from the operands.
fn new_output(ops: &Operands, lhs: &Image, rhs: &Image, data_type: DataType) -> Result<Image> {
    let mut out = Image::new(&ops.sizes, ops.tensor_elements, data_type)?;
    let meta = if lhs.pixel_size().is_defined() || !rhs.pixel_size().is_defined() {
        lhs
    } else {
        rhs
    };
    out.set_pixel_size(meta.pixel_size().clone());
    if lhs.tensor_elements() == ops.tensor_elements {
        out.set_tensor(*lhs.tensor())?;
        out.set_color_space(lhs.color_space());
    } else {
        out.set_tensor(*rhs.tensor())?;
        out.set_color_space(rhs.color_space());
    }
    Ok(out)
}

impl Image {
    /// Apply `op` sample-wise to `self` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizesDontMatch`] or [`Error::NTensorElemDontMatch`]
    /// if the operands cannot be singleton-expanded to a common geometry,
    /// and [`Error::DataTypeNotSupported`] for modulo on complex data.
    pub fn arith(&self, rhs: &Image, op: ArithOp, data_type: Option<DataType>) -> Result<Image> {
        let data_type = data_type
            .unwrap_or_else(|| DataType::suggest_arithmetic(self.data_type(), rhs.data_type()));
        let complex = self.data_type().is_complex()
            || rhs.data_type().is_complex()
            || data_type.is_complex();
        if op == ArithOp::Modulo && complex {
            let dt = if data_type.is_complex() {
                data_type
            } else if self.data_type().is_complex() {
                self.data_type()
            } else {
                rhs.data_type()
            };
            return Err(Error::DataTypeNotSupported(dt));
        }
        let ops = expand_operands(self, rhs)?;
        let out = new_output(&ops, self, rhs, data_type)?;
        {
            let mut buf = out.write()?;
            let n = buf.len();
            if data_type.is_binary() && self.data_type().is_binary() && rhs.data_type().is_binary()
            {
                for i in 0..n {
                    let r = op.binary(ops.lhs.get_f64(i) != 0.0, ops.rhs.get_f64(i) != 0.0);
                    buf.set_f64(i, if r { 1.0 } else { 0.0 });
                }
            } else if complex {
                for i in 0..n {
                    buf.set_complex(i, op.complex(ops.lhs.get_complex(i), ops.rhs.get_complex(i)));
                }
            } else {
                for i in 0..n {
                    buf.set_f64(i, op.real(ops.lhs.get_f64(i), ops.rhs.get_f64(i)));
                }
            }
        }
        Ok(out)
    }

    /// Apply `op` with `rhs`, writing the result into `self`.
    ///
    /// The result keeps `self`'s data type. If the singleton-expanded size
    /// equals `self`'s size the samples are written into the existing
    /// storage (visible through views sharing it); otherwise `self` is
    /// re-forged.
    pub fn arith_in_place(&mut self, rhs: &Image, op: ArithOp) -> Result<()> {
        let out = self.arith(rhs, op, Some(self.data_type()))?;
        if out.sizes() == self.sizes() && out.tensor_elements() == self.tensor_elements() {
            self.copy_from(&out)
        } else {
            *self = out;
            Ok(())
        }
    }

    pub fn add(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::Add, None)
    }

    pub fn subtract(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::Subtract, None)
    }

    pub fn multiply(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::Multiply, None)
    }

    pub fn divide(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::Divide, None)
    }

    pub fn safe_divide(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::SafeDivide, None)
    }

    pub fn modulo(&self, rhs: &Image) -> Result<Image> {
        self.arith(rhs, ArithOp::Modulo, None)
    }

    /// Apply `op` with a constant.
    pub fn arith_constant(
        &self,
        value: impl Into<Sample>,
        op: ArithOp,
        data_type: Option<DataType>,
    ) -> Result<Image> {
        self.arith(&Image::from_sample(value)?, op, data_type)
    }

    pub fn add_in_place(&mut self, rhs: &Image) -> Result<()> {
        self.arith_in_place(rhs, ArithOp::Add)
    }

    pub fn subtract_in_place(&mut self, rhs: &Image) -> Result<()> {
        self.arith_in_place(rhs, ArithOp::Subtract)
    }

    /// Compare sample-wise with `rhs`; the result is binary.
    ///
    /// # Errors
    ///
    /// Ordering comparisons on complex data return
    /// [`Error::DataTypeNotSupported`].
    pub fn compare(&self, rhs: &Image, op: CompareOp) -> Result<Image> {
        let complex = self.data_type().is_complex() || rhs.data_type().is_complex();
        if complex && !matches!(op, CompareOp::Equal | CompareOp::NotEqual) {
            let dt = if self.data_type().is_complex() {
                self.data_type()
            } else {
                rhs.data_type()
            };
            return Err(Error::DataTypeNotSupported(dt));
        }
        let ops = expand_operands(self, rhs)?;
        let out = new_output(&ops, self, rhs, DataType::Bin)?;
        {
            let mut buf = out.write()?;
            for i in 0..buf.len() {
                let r = if complex {
                    let eq = ops.lhs.get_complex(i) == ops.rhs.get_complex(i);
                    eq == (op == CompareOp::Equal)
                } else {
                    op.real(ops.lhs.get_f64(i), ops.rhs.get_f64(i))
                };
                buf.set_f64(i, if r { 1.0 } else { 0.0 });
            }
        }
        Ok(out)
    }

    /// Compare sample-wise with a constant.
    pub fn compare_constant(&self, value: impl Into<Sample>, op: CompareOp) -> Result<Image> {
        self.compare(&Image::from_sample(value)?, op)
    }

    pub fn equal(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::Equal)
    }

    pub fn not_equal(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::NotEqual)
    }

    pub fn greater(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::Greater)
    }

    pub fn greater_equal(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::GreaterEqual)
    }

    pub fn lesser(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::Lesser)
    }

    pub fn lesser_equal(&self, rhs: &Image) -> Result<Image> {
        self.compare(rhs, CompareOp::LesserEqual)
    }

    /// Logical NOT of a binary image.
    pub fn invert(&self) -> Result<Image> {
        self.require_forged()?;
        if !self.data_type().is_binary() {
            return Err(Error::ImageNotBinary);
        }
        let out = self.copy()?;
        {
            let mut buf = out.write()?;
            if let SampleBuffer::Bin(v) = &mut *buf {
                for b in v.iter_mut() {
                    *b = !*b;
                }
            }
        }
        Ok(out)
    }

    /// Whether the two images have the same sizes, tensor elements and
    /// sample values (compared as numbers, independent of data type).
    pub fn values_equal(&self, other: &Image) -> Result<bool> {
        if self.sizes() != other.sizes() || self.tensor_elements() != other.tensor_elements() {
            return Ok(false);
        }
        let a = self.to_buffer()?;
        let b = other.to_buffer()?;
        Ok((0..a.len()).all(|i| a.get_complex(i) == b.get_complex(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturation_and_default_type() {
        let a = Image::from_vec(&[2], vec![250u8, 3]).unwrap();
        let b = Image::from_vec(&[2], vec![10u8, 5]).unwrap();
        let s = a.add(&b).unwrap();
        assert_eq!(s.data_type(), DataType::SFloat);
        assert_eq!(s.to_vec::<f32>().unwrap(), vec![260.0, 8.0]);
        let d = a.arith(&b, ArithOp::Subtract, Some(DataType::UInt8)).unwrap();
        assert_eq!(d.to_vec::<u8>().unwrap(), vec![240, 0]);
    }

    #[test]
    fn test_binary_logic() {
        let a = Image::from_vec(&[4], vec![false, false, true, true]).unwrap();
        let b = Image::from_vec(&[4], vec![false, true, false, true]).unwrap();
        assert_eq!(a.add(&b).unwrap().to_vec::<bool>().unwrap(), vec![false, true, true, true]);
        assert_eq!(
            a.subtract(&b).unwrap().to_vec::<bool>().unwrap(),
            vec![false, false, true, false]
        );
        assert_eq!(
            a.multiply(&b).unwrap().to_vec::<bool>().unwrap(),
            vec![false, false, false, true]
        );
        assert_eq!(
            a.divide(&b).unwrap().to_vec::<bool>().unwrap(),
            vec![true, false, true, true]
        );
    }

    #[test]
    fn test_singleton_expansion_of_operands() {
        let col = Image::from_vec(&[1, 3], vec![1i32, 2, 3]).unwrap();
        let row = Image::from_vec(&[2], vec![10i32, 20]).unwrap();
        let p = col.multiply(&row).unwrap();
        assert_eq!(p.sizes().as_slice(), &[2, 3]);
        assert_eq!(
            p.to_vec::<f64>().unwrap(),
            vec![10.0, 20.0, 20.0, 40.0, 30.0, 60.0]
        );
        let bad = Image::from_vec(&[3], vec![0i32; 3]).unwrap();
        assert!(matches!(row.add(&bad), Err(Error::SizesDontMatch(_, _))));
    }

    #[test]
    fn test_safe_divide_and_modulo() {
        let a = Image::from_vec(&[3], vec![0.0f64, 6.0, 7.0]).unwrap();
        let b = Image::from_vec(&[3], vec![0.0f64, 0.0, 4.0]).unwrap();
        assert_eq!(a.safe_divide(&b).unwrap().to_vec::<f64>().unwrap(), vec![0.0, 0.0, 1.75]);
        assert_eq!(a.modulo(&b).unwrap().to_vec::<f64>().unwrap()[2], 3.0);
        let c = a.convert(DataType::SComplex).unwrap();
        assert!(matches!(c.modulo(&b), Err(Error::DataTypeNotSupported(_))));
    }

    #[test]
    fn test_complex_multiplication() {
        let a = Image::from_vec(&[1], vec![Complex64::new(1.0, 2.0)]).unwrap();
        let b = Image::from_vec(&[1], vec![Complex64::new(3.0, -1.0)]).unwrap();
        let p = a.multiply(&b).unwrap();
        assert_eq!(p.to_vec::<Complex64>().unwrap(), vec![Complex64::new(5.0, 5.0)]);
    }

    #[test]
    fn test_in_place_writes_through_views() {
        let mut a = Image::from_vec(&[3], vec![1u8, 2, 3]).unwrap();
        let view = a.clone();
        a.arith_in_place(&Image::from_sample(254u8).unwrap(), ArithOp::Add)
            .unwrap();
        assert_eq!(a.data_type(), DataType::UInt8);
        assert_eq!(view.to_vec::<u8>().unwrap(), vec![255, 255, 255]);
    }

    #[test]
    fn test_in_place_aliased_operand() {
        let mut a = Image::from_vec(&[4], vec![1i16, 2, 3, 4]).unwrap();
        let mut mirrored = a.clone();
        mirrored.mirror(&[true]).unwrap();
        a.add_in_place(&mirrored).unwrap();
        assert_eq!(a.to_vec::<i16>().unwrap(), vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_compare() {
        let a = Image::from_vec(&[3], vec![1u8, 5, 9]).unwrap();
        let g = a.compare_constant(5u8, CompareOp::GreaterEqual).unwrap();
        assert_eq!(g.data_type(), DataType::Bin);
        assert_eq!(g.to_vec::<bool>().unwrap(), vec![false, true, true]);
        assert_eq!(g.invert().unwrap().to_vec::<bool>().unwrap(), vec![true, false, false]);
    }
}
