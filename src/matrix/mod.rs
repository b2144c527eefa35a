//! Dense matrix and vector algebra.
//!
//! This module provides the numeric engine the controller is built on.
//! It is deliberately small: a row-major [`Matrix`] over a generic
//! [`Scalar`], the products and elementwise operations a state-space
//! recurrence needs, and plain `Vec<T>` signals.
//!
//! Every operation that combines two operands checks their shapes and
//! returns [`ControlError::ShapeMismatch`](crate::error::ControlError::ShapeMismatch)
//! instead of reading past the end of a buffer.
//!
//! ```text
//! Matrix::new(2, 3, 0.0)     2x3, every cell 0.0
//! a.mul(&b)?                 (r x k) * (k x c) -> r x c
//! a.mul_vec(&x)?             (r x c) * c      -> r
//! vector_add(&u, &v)?        n + n            -> n
//! ```

mod dense;
mod render;
mod vector;

use std::fmt;

use num_traits::Num;

pub use dense::Matrix;
pub use vector::{vector_add, vector_sub, zeros};

/// Numeric element type usable in a [`Matrix`] and as a controller signal.
///
/// Any `Copy` type with the four arithmetic operations, a zero and a one,
/// and an ordering (needed for saturation) qualifies. `f32`, `f64` and the
/// primitive integers all implement it.
pub trait Scalar: Num + Copy + PartialOrd + fmt::Debug + fmt::Display {}

impl<T> Scalar for T where T: Num + Copy + PartialOrd + fmt::Debug + fmt::Display {}
