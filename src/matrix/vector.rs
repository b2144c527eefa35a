//! Elementwise operations on plain vector signals.

use crate::error::{ControlError, Result};

use super::Scalar;

/// A zero vector of length `n`.
pub fn zeros<T: Scalar>(n: usize) -> Vec<T> {
    vec![T::zero(); n]
}

/// Elementwise `a + b`. Both vectors must have the same length.
pub fn vector_add<T: Scalar>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    zip_checked(a, b, "vector add", |x, y| x + y)
}

/// Elementwise `a - b`. Both vectors must have the same length.
pub fn vector_sub<T: Scalar>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    zip_checked(a, b, "vector subtract", |x, y| x - y)
}

fn zip_checked<T: Scalar>(
    a: &[T],
    b: &[T],
    operation: &'static str,
    f: impl Fn(T, T) -> T,
) -> Result<Vec<T>> {
    if a.len() != b.len() {
        return Err(ControlError::shape(operation, (a.len(), 1), (b.len(), 1)));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
}
