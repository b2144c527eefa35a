//! Line-oriented controller data file.
//!
//! One value per line, no headers:
//!
//! ```text
//! time_step
//! nx
//! ne
//! nu
//! A row-major, nx*nx lines
//! B row-major, nx*ne lines
//! C row-major, nu*nx lines
//! D row-major, nu*ne lines
//! ```
//!
//! Lines are trimmed before parsing. Blank lines after the last value are
//! ignored; any other extra line is an error.

use std::path::Path;
use std::str::{FromStr, Lines};

use tracing::{info, warn};

use crate::error::{ControlError, Result};
use crate::matrix::{Matrix, Scalar};

use super::StateSpaceController;

impl<T: Scalar + FromStr> StateSpaceController<T> {
    /// Load a controller from a data file.
    ///
    /// Fails with [`ControlError::FileOpenError`] if the file cannot be read
    /// and with [`ControlError::ParseError`] if its content is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "unable to open controller data file");
            ControlError::FileOpenError {
                path: path.display().to_string(),
                source,
            }
        })?;

        let controller = Self::from_data(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "invalid controller data file");
            e
        })?;

        info!(
            path = %path.display(),
            nx = controller.state_dim(),
            ne = controller.error_dim(),
            nu = controller.output_dim(),
            "loaded controller data"
        );
        Ok(controller)
    }

    /// Parse a controller from the content of a data file.
    pub fn from_data(input: &str) -> Result<Self> {
        let mut reader = LineReader::new(input);

        let time_step: f64 = reader.value("time step")?;
        let nx = reader.dimension("nx")?;
        let ne = reader.dimension("ne")?;
        let nu = reader.dimension("nu")?;
        reader.expect_values(coefficient_count(nx, ne, nu))?;

        let a = reader.matrix("A", nx, nx)?;
        let b = reader.matrix("B", nx, ne)?;
        let c = reader.matrix("C", nu, nx)?;
        let d = reader.matrix("D", nu, ne)?;
        reader.finish()?;

        Self::new(a, b, c, d, time_step)
    }
}

impl<T: Scalar> StateSpaceController<T> {
    /// Render the coefficients in data file format.
    ///
    /// Values are written with their `Display` form, which for `f32`/`f64`
    /// parses back to the exact same number.
    pub fn to_data_string(&self) -> String {
        let header = [
            self.time_step().to_string(),
            self.state_dim().to_string(),
            self.error_dim().to_string(),
            self.output_dim().to_string(),
        ];
        let values = [self.a(), self.b(), self.c(), self.d()]
            .into_iter()
            .flat_map(|m| m.as_slice().iter().map(|v| v.to_string()));

        header.into_iter().chain(values).map(|line| line + "\n").collect()
    }

    /// Write the coefficients to `path` in data file format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_data_string()).map_err(|source| {
            ControlError::FileWriteError {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!(path = %path.display(), "saved controller data");
        Ok(())
    }
}

/// Number of coefficient lines for the given dimensions:
/// `nx*nx + nx*ne + nu*nx + nu*ne`.
fn coefficient_count(nx: usize, ne: usize, nu: usize) -> Option<usize> {
    let a = nx.checked_mul(nx)?;
    let b = nx.checked_mul(ne)?;
    let c = nu.checked_mul(nx)?;
    let d = nu.checked_mul(ne)?;
    a.checked_add(b)?.checked_add(c)?.checked_add(d)
}

/// Cursor over the lines of a data file, tracking 1-based line numbers.
struct LineReader<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<&'a str> {
        self.line += 1;
        self.lines.next().map(str::trim).ok_or_else(|| {
            ControlError::parse(self.line, format!("unexpected end of file, expected {what}"))
        })
    }

    fn value<V: FromStr>(&mut self, what: &str) -> Result<V> {
        let text = self.next_line(what)?;
        text.parse()
            .map_err(|_| ControlError::parse(self.line, format!("expected {what}, got '{text}'")))
    }

    fn dimension(&mut self, what: &str) -> Result<usize> {
        let n: usize = self.value(what)?;
        if n == 0 {
            return Err(ControlError::parse(self.line, format!("{what} must be positive")));
        }
        Ok(n)
    }

    /// Fail on the current line unless at least `needed` lines follow.
    ///
    /// `None` means the count overflowed `usize`.
    fn expect_values(&self, needed: Option<usize>) -> Result<()> {
        let needed = needed
            .ok_or_else(|| ControlError::parse(self.line, "dimensions are too large"))?;
        let available = self.lines.clone().take(needed).count();
        if available < needed {
            return Err(ControlError::parse(
                self.line,
                format!("dimensions need {needed} coefficients, only {available} lines follow"),
            ));
        }
        Ok(())
    }

    fn matrix<T: Scalar + FromStr>(&mut self, name: &str, rows: usize, cols: usize) -> Result<Matrix<T>> {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(self.value(&format!("{name}[{row},{col}]"))?);
            }
        }
        Matrix::from_row_major(rows, cols, data)
    }

    fn finish(mut self) -> Result<()> {
        for text in self.lines.by_ref() {
            self.line += 1;
            if !text.trim().is_empty() {
                return Err(ControlError::parse(
                    self.line,
                    format!("unexpected extra line '{}'", text.trim()),
                ));
            }
        }
        Ok(())
    }
}
