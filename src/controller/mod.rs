//! Discrete-time state-space controller.
//!
//! The [`StateSpaceController`] owns the coefficient matrices, the current
//! state and the signals of the last cycle. Each call to one of the
//! `current_output*` methods runs one control cycle:
//!
//! 1. Derive `e = r - y` if a reference/measurement pair was given
//! 2. Compute `u = C x + D e`
//! 3. Clamp `u` if [`Saturation`] bounds were given
//! 4. Update `x = A x + B e` and advance the iteration counter and time
//!
//! Controllers can also be loaded from and saved to a simple line-oriented
//! data file (see [`StateSpaceController::from_file`]).

mod data_file;
mod saturation;
mod state_space;
mod trace;

pub use saturation::Saturation;
pub use state_space::StateSpaceController;
pub use trace::TRACE_SEPARATOR;
