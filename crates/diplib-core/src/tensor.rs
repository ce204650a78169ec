//! Per-pixel tensor shape
//!
//! A [`Tensor`] describes how the samples of one pixel are arranged: a
//! scalar, a vector, a full matrix in column- or row-major order, or one of
//! the compact matrix forms (diagonal, symmetric, triangular) that store
//! only the elements that are not implied. It holds no data; the image owns
//! the samples and uses the tensor to interpret them.
//!
//! Symmetric and triangular matrices store the diagonal first, followed by
//! the strict upper (or lower) triangle in column-major order:
//!
//! ```text
//! | 0 3 4 |
//! | . 1 5 |
//! | . . 2 |
//! ```

use crate::error::{Error, Result};
use crate::{IntegerArray, UnsignedArray};

/// Arrangement of tensor elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TensorShape {
    /// Column vector; a scalar is a column vector of length 1
    #[default]
    ColVector,
    /// Row vector
    RowVector,
    /// Full matrix stored column by column
    ColMajorMatrix,
    /// Full matrix stored row by row
    RowMajorMatrix,
    /// Square matrix storing only its diagonal
    DiagonalMatrix,
    /// Square symmetric matrix storing diagonal and upper triangle
    SymmetricMatrix,
    /// Square upper-triangular matrix
    UpperTriangularMatrix,
    /// Square lower-triangular matrix
    LowerTriangularMatrix,
}

/// Shape description of the samples of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tensor {
    shape: TensorShape,
    elements: usize,
    rows: usize,
}

impl Default for Tensor {
    fn default() -> Self {
        Tensor::scalar()
    }
}

/// Number of stored elements of an `n`x`n` symmetric or triangular matrix.
fn n_upper_diagonal(n: usize) -> usize {
    n * (n + 1) / 2
}

impl Tensor {
    /// A scalar (one element).
    pub fn scalar() -> Self {
        Tensor {
            shape: TensorShape::ColVector,
            elements: 1,
            rows: 1,
        }
    }

    /// A column vector with `n` elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `n` is 0.
    pub fn vector(n: usize) -> Result<Self> {
        let mut t = Tensor::scalar();
        t.set_vector(n)?;
        Ok(t)
    }

    /// A column-major `rows`x`cols` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either size is 0.
    pub fn matrix(rows: usize, cols: usize) -> Result<Self> {
        let mut t = Tensor::scalar();
        t.set_matrix(rows, cols)?;
        Ok(t)
    }

    /// A tensor with the given shape and sizes.
    ///
    /// # Errors
    ///
    /// See [`set_shape`](Self::set_shape).
    pub fn with_shape(shape: TensorShape, rows: usize, cols: usize) -> Result<Self> {
        let mut t = Tensor::scalar();
        t.set_shape(shape, rows, cols)?;
        Ok(t)
    }

    /// Make this a scalar.
    pub fn set_scalar(&mut self) {
        *self = Tensor::scalar();
    }

    /// Make this a column vector with `n` elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `n` is 0.
    pub fn set_vector(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::InvalidParameter(
                "tensor sizes must be non-zero".to_string(),
            ));
        }
        self.shape = TensorShape::ColVector;
        self.elements = n;
        self.rows = n;
        Ok(())
    }

    /// Make this a column-major matrix; degenerates to a vector when one of
    /// the sizes is 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either size is 0.
    pub fn set_matrix(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.set_shape(TensorShape::ColMajorMatrix, rows, cols)
    }

    /// Set shape and sizes, validating the constraints of the shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a size is 0, if a vector shape
    /// has more than one column (or row), or if a diagonal, symmetric or
    /// triangular matrix is not square.
    pub fn set_shape(&mut self, shape: TensorShape, rows: usize, cols: usize) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidParameter(
                "number of rows and columns must be non-zero".to_string(),
            ));
        }
        let square = |what: &str| -> Result<()> {
            if rows != cols {
                return Err(Error::InvalidParameter(format!("a {what} matrix must be square")));
            }
            Ok(())
        };
        match shape {
            TensorShape::ColVector => {
                if cols != 1 {
                    return Err(Error::InvalidParameter(
                        "a column vector can have only one column".to_string(),
                    ));
                }
                self.elements = rows;
                self.rows = rows;
            }
            TensorShape::RowVector => {
                if rows != 1 {
                    return Err(Error::InvalidParameter(
                        "a row vector can have only one row".to_string(),
                    ));
                }
                self.elements = cols;
                self.rows = 1;
            }
            TensorShape::ColMajorMatrix | TensorShape::RowMajorMatrix => {
                self.elements = rows * cols;
                self.rows = rows;
            }
            TensorShape::DiagonalMatrix => {
                square("diagonal")?;
                self.elements = rows;
                self.rows = rows;
            }
            TensorShape::SymmetricMatrix => {
                square("symmetric")?;
                self.elements = n_upper_diagonal(rows);
                self.rows = rows;
            }
            TensorShape::UpperTriangularMatrix | TensorShape::LowerTriangularMatrix => {
                square("triangular")?;
                self.elements = n_upper_diagonal(rows);
                self.rows = rows;
            }
        }
        self.shape = shape;
        self.correct_shape();
        Ok(())
    }

    /// Set sizes from a 0-, 1- or 2-element array (scalar, vector, matrix).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionalityNotSupported`] for more than 2 sizes.
    pub fn set_sizes(&mut self, sizes: &[usize]) -> Result<()> {
        match *sizes {
            [] => {
                self.set_scalar();
                Ok(())
            }
            [n] => self.set_vector(n),
            [r, c] => self.set_matrix(r, c),
            _ => Err(Error::DimensionalityNotSupported(sizes.len())),
        }
    }

    // Full matrices with a single row or column are vectors.
    fn correct_shape(&mut self) {
        if matches!(
            self.shape,
            TensorShape::ColMajorMatrix | TensorShape::RowMajorMatrix
        ) {
            if self.rows == self.elements {
                self.shape = TensorShape::ColVector;
            } else if self.rows == 1 {
                self.shape = TensorShape::RowVector;
            }
        }
    }

    /// The tensor shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Number of stored elements.
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        match self.shape {
            TensorShape::ColVector => 1,
            TensorShape::RowVector => self.elements,
            TensorShape::ColMajorMatrix | TensorShape::RowMajorMatrix => {
                self.elements / self.rows
            }
            _ => self.rows,
        }
    }

    /// Sizes as an array: empty for a scalar, one element for a column
    /// vector, two elements (rows, columns) otherwise.
    pub fn sizes(&self) -> UnsignedArray {
        if self.is_scalar() {
            UnsignedArray::new()
        } else if self.shape == TensorShape::ColVector {
            UnsignedArray::from_slice(&[self.elements])
        } else {
            UnsignedArray::from_slice(&[self.rows, self.columns()])
        }
    }

    /// One element.
    pub fn is_scalar(&self) -> bool {
        self.elements == 1
    }

    /// A row or column vector with more than one element.
    pub fn is_vector(&self) -> bool {
        !self.is_scalar()
            && matches!(self.shape, TensorShape::ColVector | TensorShape::RowVector)
    }

    /// Diagonal matrix storage.
    pub fn is_diagonal(&self) -> bool {
        self.shape == TensorShape::DiagonalMatrix
    }

    /// Symmetric matrix storage.
    pub fn is_symmetric(&self) -> bool {
        self.shape == TensorShape::SymmetricMatrix
    }

    /// Triangular matrix storage (upper or lower).
    pub fn is_triangular(&self) -> bool {
        matches!(
            self.shape,
            TensorShape::UpperTriangularMatrix | TensorShape::LowerTriangularMatrix
        )
    }

    /// As many rows as columns (scalars included).
    pub fn is_square(&self) -> bool {
        self.rows == self.columns()
    }

    /// Whether elements are stored in plain column-major order.
    pub fn has_normal_order(&self) -> bool {
        matches!(
            self.shape,
            TensorShape::ColVector | TensorShape::RowVector | TensorShape::ColMajorMatrix
        )
    }

    /// Reshape to a column-major matrix with `rows` rows, keeping the
    /// element count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `rows` does not divide the
    /// number of elements.
    pub fn change_shape(&mut self, rows: usize) -> Result<()> {
        if self.rows != rows {
            if rows == 0 || self.elements % rows != 0 {
                return Err(Error::InvalidParameter(
                    "cannot reshape tensor to requested size".to_string(),
                ));
            }
            self.rows = rows;
            self.shape = TensorShape::ColMajorMatrix;
            self.correct_shape();
        }
        Ok(())
    }

    /// Reshape to a column vector of all elements.
    pub fn change_shape_to_vector(&mut self) {
        self.shape = TensorShape::ColVector;
        self.rows = self.elements;
    }

    /// Transpose; only the shape description changes.
    pub fn transpose(&mut self) {
        match self.shape {
            TensorShape::ColVector => {
                self.shape = TensorShape::RowVector;
                self.rows = 1;
            }
            TensorShape::RowVector => {
                self.shape = TensorShape::ColVector;
                self.rows = self.elements;
            }
            TensorShape::ColMajorMatrix => {
                self.shape = TensorShape::RowMajorMatrix;
                self.rows = self.elements / self.rows;
            }
            TensorShape::RowMajorMatrix => {
                self.shape = TensorShape::ColMajorMatrix;
                self.rows = self.elements / self.rows;
            }
            TensorShape::DiagonalMatrix | TensorShape::SymmetricMatrix => {}
            TensorShape::UpperTriangularMatrix => self.shape = TensorShape::LowerTriangularMatrix,
            TensorShape::LowerTriangularMatrix => self.shape = TensorShape::UpperTriangularMatrix,
        }
    }

    /// Restrict to the diagonal, updating `stride` (the tensor stride of the
    /// image) so that consecutive diagonal elements are `stride` apart.
    pub fn extract_diagonal(&mut self, stride: &mut isize) {
        if self.is_scalar() || self.is_diagonal() {
            self.change_shape_to_vector();
        } else if self.is_vector() {
            self.set_scalar();
        } else if self.is_symmetric() || self.is_triangular() {
            let n = self.rows;
            self.shape = TensorShape::ColVector;
            self.elements = n;
            self.rows = n;
        } else {
            let m = self.rows;
            let n = self.columns();
            let row_major = self.shape == TensorShape::RowMajorMatrix;
            let len = m.min(n);
            self.shape = TensorShape::ColVector;
            self.elements = len;
            self.rows = len;
            *stride *= if row_major { n as isize + 1 } else { m as isize + 1 };
        }
    }

    /// Restrict to row `index`. Returns the offset of its first element
    /// and updates `stride`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= rows`, and
    /// [`Error::NotSupported`] for compact (non-full) representations.
    pub fn extract_row(&mut self, index: usize, stride: &mut isize) -> Result<isize> {
        if index >= self.rows {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                len: self.rows,
            });
        }
        let n = self.columns();
        let offset = match self.shape {
            TensorShape::ColVector | TensorShape::ColMajorMatrix => {
                let offset = index as isize * *stride;
                *stride *= self.rows as isize;
                offset
            }
            TensorShape::RowVector | TensorShape::RowMajorMatrix => (index * n) as isize * *stride,
            _ => {
                return Err(Error::NotSupported(
                    "cannot obtain row for non-full tensor representation".to_string(),
                ));
            }
        };
        self.shape = TensorShape::RowVector;
        self.elements = n;
        self.rows = 1;
        Ok(offset)
    }

    /// Restrict to column `index`. Returns the offset of its first element
    /// and updates `stride`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= columns`, and
    /// [`Error::NotSupported`] for compact (non-full) representations.
    pub fn extract_column(&mut self, index: usize, stride: &mut isize) -> Result<isize> {
        let n = self.columns();
        if index >= n {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                len: n,
            });
        }
        let offset = match self.shape {
            TensorShape::ColVector | TensorShape::ColMajorMatrix => {
                (index * self.rows) as isize * *stride
            }
            TensorShape::RowVector | TensorShape::RowMajorMatrix => {
                let offset = index as isize * *stride;
                *stride *= n as isize;
                offset
            }
            _ => {
                return Err(Error::NotSupported(
                    "cannot obtain column for non-full tensor representation".to_string(),
                ));
            }
        };
        self.shape = TensorShape::ColVector;
        self.elements = self.rows;
        Ok(offset)
    }

    /// For every logical element `(m, n)`, at position `n * rows + m`, the
    /// index of the stored element, or -1 if the element is an implicit zero.
    pub fn look_up_table(&self) -> IntegerArray {
        let m_rows = self.rows;
        let n_cols = self.columns();
        let mut lut = IntegerArray::filled(m_rows * n_cols, -1);
        let mut index = 0isize;
        match self.shape {
            TensorShape::ColVector | TensorShape::RowVector | TensorShape::ColMajorMatrix => {
                for n in 0..n_cols {
                    for m in 0..m_rows {
                        lut[n * m_rows + m] = index;
                        index += 1;
                    }
                }
            }
            TensorShape::RowMajorMatrix => {
                for m in 0..m_rows {
                    for n in 0..n_cols {
                        lut[n * m_rows + m] = index;
                        index += 1;
                    }
                }
            }
            TensorShape::DiagonalMatrix => {
                for m in 0..m_rows {
                    lut[m * m_rows + m] = index;
                    index += 1;
                }
            }
            TensorShape::SymmetricMatrix
            | TensorShape::UpperTriangularMatrix
            | TensorShape::LowerTriangularMatrix => {
                for m in 0..m_rows {
                    lut[m * m_rows + m] = index;
                    index += 1;
                }
                for n in 1..n_cols {
                    for m in 0..n {
                        match self.shape {
                            TensorShape::SymmetricMatrix => {
                                lut[n * m_rows + m] = index;
                                lut[m * m_rows + n] = index;
                            }
                            TensorShape::UpperTriangularMatrix => lut[n * m_rows + m] = index,
                            _ => lut[m * m_rows + n] = index,
                        }
                        index += 1;
                    }
                }
            }
        }
        lut
    }

    /// Index of the stored element for logical position `indices`
    /// (`[i]` for vectors, `[row, column]` for matrices).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArrayParameterWrongLength`] if `indices` has other
    /// than 1 or 2 elements, and [`Error::IndexOutOfRange`] if the position
    /// is outside the matrix or refers to an implicit zero.
    pub fn index(&self, indices: &[usize]) -> Result<usize> {
        let (i, j) = match *indices {
            [i] => (i, 0),
            [i, j] => (i, j),
            _ => {
                return Err(Error::ArrayParameterWrongLength {
                    expected: 2,
                    actual: indices.len(),
                });
            }
        };
        let m = self.rows;
        let n = self.columns();
        // A single index into a row vector addresses its columns.
        let (i, j) = if indices.len() == 1 && self.shape == TensorShape::RowVector {
            (0, i)
        } else {
            (i, j)
        };
        if i >= m || j >= n {
            return Err(Error::IndexOutOfRange {
                index: (j * m + i) as isize,
                len: m * n,
            });
        }
        let stored = self.look_up_table()[j * m + i];
        if stored < 0 {
            return Err(Error::IndexOutOfRange {
                index: (j * m + i) as isize,
                len: m * n,
            });
        }
        Ok(stored as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_counts() {
        assert_eq!(Tensor::scalar().elements(), 1);
        assert_eq!(Tensor::vector(3).unwrap().elements(), 3);
        assert_eq!(Tensor::matrix(2, 3).unwrap().elements(), 6);
        let diag = Tensor::with_shape(TensorShape::DiagonalMatrix, 3, 3).unwrap();
        assert_eq!(diag.elements(), 3);
        let sym = Tensor::with_shape(TensorShape::SymmetricMatrix, 3, 3).unwrap();
        assert_eq!(sym.elements(), 6);
        assert_eq!(sym.columns(), 3);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(Tensor::vector(0).is_err());
        assert!(Tensor::with_shape(TensorShape::DiagonalMatrix, 2, 3).is_err());
        assert!(Tensor::with_shape(TensorShape::ColVector, 2, 2).is_err());
        assert!(Tensor::with_shape(TensorShape::UpperTriangularMatrix, 3, 2).is_err());
    }

    #[test]
    fn test_matrix_degenerates_to_vector() {
        let t = Tensor::matrix(1, 4).unwrap();
        assert_eq!(t.shape(), TensorShape::RowVector);
        let t = Tensor::matrix(4, 1).unwrap();
        assert_eq!(t.shape(), TensorShape::ColVector);
    }

    #[test]
    fn test_symmetric_look_up_table() {
        let sym = Tensor::with_shape(TensorShape::SymmetricMatrix, 3, 3).unwrap();
        let lut = sym.look_up_table();
        // column-major logical layout
        assert_eq!(lut.as_slice(), &[0, 3, 4, 3, 1, 5, 4, 5, 2]);
        assert_eq!(sym.index(&[0, 2]).unwrap(), 4);
        assert_eq!(sym.index(&[2, 0]).unwrap(), 4);
    }

    #[test]
    fn test_triangular_implicit_zeros() {
        let upper = Tensor::with_shape(TensorShape::UpperTriangularMatrix, 3, 3).unwrap();
        let lut = upper.look_up_table();
        assert_eq!(lut.as_slice(), &[0, -1, -1, 3, 1, -1, 4, 5, 2]);
        assert!(upper.index(&[2, 0]).is_err());
        assert_eq!(upper.index(&[1, 2]).unwrap(), 5);
        let diag = Tensor::with_shape(TensorShape::DiagonalMatrix, 2, 2).unwrap();
        assert!(diag.index(&[0, 1]).is_err());
        assert_eq!(diag.index(&[1, 1]).unwrap(), 1);
    }

    #[test]
    fn test_transpose_and_row_extraction() {
        let mut t = Tensor::matrix(2, 3).unwrap();
        let mut stride = 1;
        let mut row = t;
        let offset = row.extract_row(1, &mut stride).unwrap();
        assert_eq!(offset, 1);
        assert_eq!(stride, 2);
        assert_eq!(row.shape(), TensorShape::RowVector);
        assert_eq!(row.elements(), 3);

        t.transpose();
        assert_eq!(t.shape(), TensorShape::RowMajorMatrix);
        assert_eq!(t.rows(), 3);
        assert_eq!(t.columns(), 2);
        assert_eq!(t.index(&[2, 1]).unwrap(), 5);
    }

    #[test]
    fn test_extract_diagonal_of_full_matrix() {
        let mut t = Tensor::matrix(3, 3).unwrap();
        let mut stride = 1;
        t.extract_diagonal(&mut stride);
        assert_eq!(t.elements(), 3);
        assert_eq!(stride, 4);
    }

    #[test]
    fn test_change_shape() {
        let mut t = Tensor::vector(6).unwrap();
        t.change_shape(2).unwrap();
        assert_eq!(t.shape(), TensorShape::ColMajorMatrix);
        assert_eq!(t.columns(), 3);
        assert!(t.change_shape(4).is_err());
    }
}
