//! Human-readable diagnostics: per-cycle trace rows and a coefficient summary.

use std::io;

use crate::matrix::Scalar;

use super::StateSpaceController;

/// Column separator used in trace output.
pub const TRACE_SEPARATOR: &str = " ; ";

impl<T: Scalar> StateSpaceController<T> {
    /// Column names: `t(s)`, then `r*`, `y*`, `e*` (ne each), `u*` (nu), `x*` (nx).
    pub fn trace_header(&self) -> String {
        let mut columns = vec!["t(s)".to_string()];
        for (prefix, n) in [
            ("r", self.error_dim()),
            ("y", self.error_dim()),
            ("e", self.error_dim()),
            ("u", self.output_dim()),
            ("x", self.state_dim()),
        ] {
            columns.extend((0..n).map(|k| format!("{prefix}{k}")));
        }
        columns.join(TRACE_SEPARATOR)
    }

    /// Current values in the same column order as [`trace_header`](Self::trace_header).
    pub fn trace_row(&self) -> String {
        let signals = [
            self.reference(),
            self.measurement(),
            self.error(),
            self.output(),
            self.state(),
        ];
        std::iter::once(self.time().to_string())
            .chain(signals.into_iter().flatten().map(|v| v.to_string()))
            .collect::<Vec<_>>()
            .join(TRACE_SEPARATOR)
    }

    /// Write the trace row for the last cycle, preceded by the header on the
    /// first advanced cycle.
    ///
    /// Nothing is written before the first cycle.
    pub fn write_trace<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        if self.iteration() == 0 {
            return Ok(());
        }
        if self.iteration() == 1 {
            writeln!(out, "{}", self.trace_header())?;
        }
        writeln!(out, "{}", self.trace_row())
    }
}

impl<T: Scalar + Into<f64>> StateSpaceController<T> {
    /// Time step and A, B, C, D with values rounded up to two decimals.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Displayed values are rounded up to two decimals.\n\nTime step = {} s\n\n",
            self.time_step()
        );
        for (name, m) in [("A", self.a()), ("B", self.b()), ("C", self.c()), ("D", self.d())] {
            out.push_str(&format!("{name} =\n{}\n", m.render_rounded()));
        }
        out
    }
}
