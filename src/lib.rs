//! # sscontrol
//!
//! A discrete-time linear state-space controller.
//!
//! This library provides:
//! - A small dense matrix/vector engine over a generic scalar type
//! - A controller running `u = C x + D e`, `x = A x + B e` once per cycle
//! - Optional output saturation (shared or per-channel bounds)
//! - Loading and saving coefficients in a line-oriented data file
//! - A line-based stdin/stdout driver (CLI only)
//!
//! ## Architecture
//!
//! - [`matrix`] - Dense matrix, vector helpers and textual rendering
//! - [`controller`] - The state-space controller, saturation and data file codec
//! - [`stream`] - Batch driver reading cycles from a stream (CLI only)
//! - [`error`] - Unified error type
//!
//! ## Usage
//!
//! ```
//! use sscontrol::{Matrix, StateSpaceController};
//!
//! let mut ctrl = StateSpaceController::new(
//!     Matrix::new(1, 1, 1.0),
//!     Matrix::new(1, 1, 1.0),
//!     Matrix::new(1, 1, 1.0),
//!     Matrix::new(1, 1, 0.0),
//!     0.1,
//! )?;
//!
//! assert_eq!(ctrl.current_output(&[1.0])?, vec![0.0]);
//! assert_eq!(ctrl.current_output(&[1.0])?, vec![1.0]);
//! # Ok::<(), sscontrol::ControlError>(())
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! printf '1\n1\n1\n' | sscontrol controller.dat --u-min 0 --u-max 1
//! ```
//!
//! ## Threading
//!
//! Everything runs synchronously on the caller's thread. A controller has no
//! internal synchronization; share one across threads behind a `Mutex`.

pub mod controller;
pub mod error;
pub mod matrix;

#[cfg(feature = "cli")]
pub mod stream;

// Re-export main types for convenience
pub use controller::{Saturation, StateSpaceController};
pub use error::{ControlError, Result};
pub use matrix::{Matrix, Scalar};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmController;
