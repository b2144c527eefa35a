//! Textual rendering of matrices.
//!
//! Purely presentational: nothing here feeds back into numeric code.

use std::fmt;

use super::{Matrix, Scalar};

/// One row per line, values separated by a single space.
impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self[(row, col)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<T: Scalar + Into<f64>> Matrix<T> {
    /// Same grid as `Display`, with each value rounded up to two decimals.
    ///
    /// Meant for on-screen summaries only; the printed values are not exact.
    pub fn render_rounded(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows() {
            let line: Vec<String> = (0..self.cols())
                .map(|col| round_up_2(self[(row, col)].into()).to_string())
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }
}

fn round_up_2(v: f64) -> f64 {
    (v * 100.0).ceil() / 100.0
}
