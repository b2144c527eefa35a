//! Row-major dense matrix.

use std::ops::{Index, IndexMut};

use crate::error::{ControlError, Result};

use super::Scalar;

/// A `rows x cols` matrix stored row-major in a single buffer.
///
/// The buffer always holds exactly `rows * cols` elements. The shape is fixed
/// once built; the only ways to change it are whole-object assignment or the
/// in-place product [`Matrix::mul_assign`].
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Create a `rows x cols` matrix with every cell set to `initial`.
    pub fn new(rows: usize, cols: usize, initial: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![initial; rows * cols],
        }
    }

    /// Create a `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, T::zero())
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Build a matrix from a row-major buffer.
    ///
    /// Fails if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(ControlError::shape(
                "from_row_major",
                (rows, cols),
                (1, data.len()),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from a list of rows.
    ///
    /// Every row must have the same length as the first one.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);

        for row in rows {
            if row.len() != n_cols {
                return Err(ControlError::shape(
                    "from_rows",
                    (n_rows, n_cols),
                    (1, row.len()),
                ));
            }
            data.extend(row);
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the matrix has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The row-major backing buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// A single row, or `None` if `row` is out of range.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// Get element at (row, col), or `None` if out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.offset(row, col).map(|i| self.data[i])
    }

    /// Mutable reference to element at (row, col), or `None` if out of range.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.offset(row, col).map(move |i| &mut self.data[i])
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    fn check_same_shape(&self, rhs: &Self, operation: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(ControlError::shape(operation, self.shape(), rhs.shape()));
        }
        Ok(())
    }

    /// Elementwise sum. Both operands must have the same shape.
    pub fn add(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape(rhs, "matrix add")?;
        Ok(self.zip_with(rhs, |a, b| a + b))
    }

    /// Elementwise difference. Both operands must have the same shape.
    pub fn sub(&self, rhs: &Self) -> Result<Self> {
        self.check_same_shape(rhs, "matrix subtract")?;
        Ok(self.zip_with(rhs, |a, b| a - b))
    }

    /// Matrix product `self * rhs`.
    ///
    /// Requires `self.cols() == rhs.rows()`; the result is
    /// `self.rows() x rhs.cols()`.
    pub fn mul(&self, rhs: &Self) -> Result<Self> {
        if self.cols != rhs.rows {
            return Err(ControlError::shape(
                "matrix multiply",
                self.shape(),
                rhs.shape(),
            ));
        }

        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = T::zero();
                for k in 0..self.cols {
                    acc = acc + self.data[i * self.cols + k] * rhs.data[k * rhs.cols + j];
                }
                out.data[i * rhs.cols + j] = acc;
            }
        }
        Ok(out)
    }

    /// In-place elementwise sum. `self` is untouched on error.
    pub fn add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape(rhs, "matrix add")?;
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a + b;
        }
        Ok(())
    }

    /// In-place elementwise difference. `self` is untouched on error.
    pub fn sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.check_same_shape(rhs, "matrix subtract")?;
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a - b;
        }
        Ok(())
    }

    /// Replace `self` with `self * rhs`. `self` is untouched on error.
    pub fn mul_assign(&mut self, rhs: &Self) -> Result<()> {
        *self = Matrix::mul(self, rhs)?;
        Ok(())
    }

    /// Swap rows and columns. Works for any shape.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Matrix-vector product.
    ///
    /// Requires `self.cols() == v.len()`; the result has length `self.rows()`.
    pub fn mul_vec(&self, v: &[T]) -> Result<Vec<T>> {
        if self.cols != v.len() {
            return Err(ControlError::shape(
                "matrix-vector multiply",
                self.shape(),
                (v.len(), 1),
            ));
        }

        Ok((0..self.rows)
            .map(|i| {
                self.data[i * self.cols..(i + 1) * self.cols]
                    .iter()
                    .zip(v)
                    .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
            })
            .collect())
    }

    /// The main diagonal.
    ///
    /// For a square matrix this has length `rows`; otherwise it stops at the
    /// shorter dimension.
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.rows.min(self.cols))
            .map(|i| self.data[i * self.cols + i])
            .collect()
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_with(&self, rhs: &Self, f: impl Fn(T, T) -> T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl<T: Scalar> Default for Matrix<T> {
    /// A 1x1 zero matrix.
    fn default() -> Self {
        Self::zeros(1, 1)
    }
}

/// Unchecked-style indexing; panics on out-of-range like slice indexing.
impl<T: Scalar> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        match self.offset(row, col) {
            Some(i) => &self.data[i],
            None => panic!(
                "index ({row}, {col}) out of range for {}x{} matrix",
                self.rows, self.cols
            ),
        }
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        match self.offset(row, col) {
            Some(i) => &mut self.data[i],
            None => panic!(
                "index ({row}, {col}) out of range for {}x{} matrix",
                self.rows, self.cols
            ),
        }
    }
}

// Scalar arithmetic. Division by zero follows `T`'s own semantics.
macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> std::ops::$trait<T> for &Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: T) -> Matrix<T> {
                self.map(|v| v $op rhs)
            }
        }
    };
}

scalar_op!(Add, add, +);
scalar_op!(Sub, sub, -);
scalar_op!(Mul, mul, *);
scalar_op!(Div, div, /);
