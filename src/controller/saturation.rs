//! Output limiting.

use crate::error::{ControlError, Result};
use crate::matrix::Scalar;

/// Bounds used to clamp the controller output.
///
/// Clamping only changes the reported output. The state update always uses
/// the unsaturated error signal, so limiting never feeds back into `x`.
#[derive(Debug, Clone, PartialEq)]
pub enum Saturation<T> {
    /// The same `[min, max]` range for every output channel.
    Uniform { min: T, max: T },
    /// One `[min[k], max[k]]` range per output channel.
    PerChannel { min: Vec<T>, max: Vec<T> },
}

impl<T: Scalar> Saturation<T> {
    /// Shared bounds for all channels. Requires `min <= max`.
    ///
    /// An inverted pair is rejected here rather than accepted and clamped
    /// to `max` on every cycle.
    pub fn uniform(min: T, max: T) -> Result<Self> {
        check_pair(0, min, max)?;
        Ok(Self::Uniform { min, max })
    }

    /// Per-channel bounds. Both vectors must have the same length and
    /// `min[k] <= max[k]` for every channel.
    pub fn per_channel(min: Vec<T>, max: Vec<T>) -> Result<Self> {
        if min.len() != max.len() {
            return Err(ControlError::bounds(format!(
                "{} lower bounds but {} upper bounds",
                min.len(),
                max.len()
            )));
        }
        for (k, (&lo, &hi)) in min.iter().zip(&max).enumerate() {
            check_pair(k, lo, hi)?;
        }
        Ok(Self::PerChannel { min, max })
    }

    /// Check that these bounds can be applied to an output of length `nu`.
    pub fn check(&self, nu: usize) -> Result<()> {
        match self {
            Self::Uniform { .. } => Ok(()),
            Self::PerChannel { min, .. } if min.len() == nu => Ok(()),
            Self::PerChannel { min, .. } => Err(ControlError::bounds(format!(
                "{} channel bounds for an output of length {nu}",
                min.len()
            ))),
        }
    }

    /// Clamp every component of `u` into its range, in place.
    ///
    /// `u` is untouched if the bounds do not fit its length.
    pub fn apply(&self, u: &mut [T]) -> Result<()> {
        self.check(u.len())?;
        match self {
            Self::Uniform { min, max } => {
                for v in u.iter_mut() {
                    *v = clamp(*v, *min, *max);
                }
            }
            Self::PerChannel { min, max } => {
                for (k, v) in u.iter_mut().enumerate() {
                    *v = clamp(*v, min[k], max[k]);
                }
            }
        }
        Ok(())
    }
}

fn check_pair<T: Scalar>(channel: usize, min: T, max: T) -> Result<()> {
    // Written so that an unordered pair (NaN) is rejected as well.
    if !(min <= max) {
        return Err(ControlError::bounds(format!(
            "channel {channel}: lower bound {min} exceeds upper bound {max}"
        )));
    }
    Ok(())
}

fn clamp<T: Scalar>(v: T, min: T, max: T) -> T {
    if v > max {
        max
    } else if v < min {
        min
    } else {
        v
    }
}
