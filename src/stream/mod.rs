//! Line-oriented batch driver for the CLI frontend.
//!
//! Reads one control cycle per input line and writes one output line per
//! cycle. Input lines hold whitespace-separated numbers: `ne` error values,
//! or `ne` reference values followed by `ne` measurements. Blank lines and
//! lines starting with `#` are skipped.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::controller::{Saturation, StateSpaceController};
use crate::error::{ControlError, Result};

/// What each input line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// `e0 .. e(ne-1)`
    #[default]
    Error,
    /// `r0 .. r(ne-1) y0 .. y(ne-1)`
    ReferenceMeasurement,
}

/// Configuration for a stream run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// How input lines are interpreted.
    pub mode: InputMode,
    /// Optional output limits applied every cycle.
    pub limits: Option<Saturation<f64>>,
    /// Write full trace rows instead of the bare output.
    pub trace: bool,
}

impl RunConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input mode.
    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Clamp the output of every cycle.
    pub fn with_limits(mut self, limits: Saturation<f64>) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Write trace rows (header + t, r, y, e, u, x) instead of bare outputs.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Run the controller over every cycle line of `input`.
///
/// Returns the number of cycles processed. Stops at the first malformed line;
/// cycles before it have already been written.
pub fn process_stream<R: BufRead, W: Write>(
    controller: &mut StateSpaceController<f64>,
    config: &RunConfig,
    input: R,
    mut output: W,
) -> Result<usize> {
    let ne = controller.error_dim();
    let expected = match config.mode {
        InputMode::Error => ne,
        InputMode::ReferenceMeasurement => 2 * ne,
    };
    let mut cycles = 0;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| ControlError::StreamInput {
            line: line_no,
            message: e.to_string(),
        })?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let values = parse_values(text, line_no)?;
        if values.len() != expected {
            return Err(ControlError::StreamInput {
                line: line_no,
                message: format!("expected {expected} values, got {}", values.len()),
            });
        }

        let limits = config.limits.as_ref();
        let u = match (config.mode, limits) {
            (InputMode::Error, None) => controller.current_output(&values)?,
            (InputMode::Error, Some(l)) => controller.current_output_saturated(&values, l)?,
            (InputMode::ReferenceMeasurement, None) => {
                let (r, y) = values.split_at(ne);
                controller.current_output_tracking(r, y)?
            }
            (InputMode::ReferenceMeasurement, Some(l)) => {
                let (r, y) = values.split_at(ne);
                controller.current_output_tracking_saturated(r, y, l)?
            }
        };

        if config.trace {
            controller.write_trace(&mut output).map_err(output_error)?;
        } else {
            let line: Vec<String> = u.iter().map(f64::to_string).collect();
            writeln!(output, "{}", line.join(" ")).map_err(output_error)?;
        }
        cycles += 1;
    }

    output.flush().map_err(output_error)?;
    debug!(cycles, "stream processed");
    Ok(cycles)
}

/// Run the controller from stdin to stdout.
pub fn process_stdio(controller: &mut StateSpaceController<f64>, config: &RunConfig) -> Result<usize> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    process_stream(controller, config, stdin.lock(), io::BufWriter::new(stdout.lock()))
}

fn parse_values(text: &str, line: usize) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| ControlError::StreamInput {
                line,
                message: format!("expected a number, got '{token}'"),
            })
        })
        .collect()
}

fn output_error(e: io::Error) -> ControlError {
    ControlError::StreamOutput {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn integrator() -> StateSpaceController<f64> {
        StateSpaceController::new(
            Matrix::new(1, 1, 1.0),
            Matrix::new(1, 1, 1.0),
            Matrix::new(1, 1, 1.0),
            Matrix::new(1, 1, 0.0),
            1.0,
        )
        .unwrap()
    }

    fn run(config: &RunConfig, input: &str) -> Result<(usize, String)> {
        let mut ctrl = integrator();
        let mut out = Vec::new();
        let cycles = process_stream(&mut ctrl, config, input.as_bytes(), &mut out)?;
        Ok((cycles, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn test_error_mode() {
        let (cycles, out) = run(&RunConfig::new(), "1\n1\n\n# comment\n1\n").unwrap();
        assert_eq!(cycles, 3);
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn test_saturated_reference_mode() {
        let config = RunConfig::new()
            .with_mode(InputMode::ReferenceMeasurement)
            .with_limits(Saturation::uniform(0.0, 1.0).unwrap());
        let (_, out) = run(&config, "2 1\n2 1\n2 1\n").unwrap();
        assert_eq!(out, "0\n1\n1\n");
    }

    #[test]
    fn test_trace_mode() {
        let config = RunConfig::new().with_trace(true);
        let (_, out) = run(&config, "1\n1\n").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "t(s) ; r0 ; y0 ; e0 ; u0 ; x0");
        assert_eq!(lines[1], "0 ; 0 ; 0 ; 1 ; 0 ; 1");
        assert_eq!(lines[2], "1 ; 0 ; 0 ; 1 ; 1 ; 2");
    }

    #[test]
    fn test_bad_lines() {
        let err = run(&RunConfig::new(), "1\nfoo\n").unwrap_err();
        assert!(matches!(err, ControlError::StreamInput { line: 2, .. }));

        let err = run(&RunConfig::new(), "1 2\n").unwrap_err();
        assert!(matches!(err, ControlError::StreamInput { line: 1, .. }));

        let config = RunConfig::new().with_mode(InputMode::ReferenceMeasurement);
        assert!(run(&config, "1\n").is_err());
    }

    #[test]
    fn test_reference_mode_splits_channels() {
        // nx = 1, ne = 2, nu = 1: x accumulates e0 + e1
        let mut ctrl = StateSpaceController::new(
            Matrix::new(1, 1, 1.0),
            Matrix::new(1, 2, 1.0),
            Matrix::new(1, 1, 1.0),
            Matrix::new(1, 2, 0.0),
            1.0,
        )
        .unwrap();
        let config = RunConfig::new().with_mode(InputMode::ReferenceMeasurement);
        let mut out = Vec::new();

        let cycles = process_stream(&mut ctrl, &config, "3 1 1 0\n3 1 1 0\n".as_bytes(), &mut out).unwrap();
        assert_eq!(cycles, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "0\n3\n");
        assert_eq!(ctrl.error(), &[2.0, 1.0]);
        assert_eq!(ctrl.state(), &[6.0]);
    }

    #[test]
    fn test_channel_limits_wrong_length() {
        let mut ctrl = integrator();
        let config = RunConfig::new()
            .with_mode(InputMode::ReferenceMeasurement)
            .with_limits(Saturation::per_channel(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap());
        let mut out = Vec::new();

        let err = process_stream(&mut ctrl, &config, "2 1\n2 1\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, ControlError::InvalidBounds { .. }));
        assert!(out.is_empty());
        assert_eq!(ctrl.iteration(), 0);
        assert_eq!(ctrl.state(), &[0.0]);
    }
}
