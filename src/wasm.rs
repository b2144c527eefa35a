//! WASM bindings for sscontrol.
//!
//! This module provides JavaScript-friendly bindings around an `f64`
//! [`StateSpaceController`], e.g. for driving a simulated plant in the browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmController } from 'sscontrol';
//!
//! await init();
//!
//! // time step, nx, ne, nu, then A, B, C, D row-major
//! const data = "1\n1\n1\n1\n1\n1\n1\n0\n";
//!
//! const ctrl = new WasmController(data);
//! ctrl.set_limits(0.0, 1.0);
//!
//! // Once per control cycle:
//! const u = ctrl.step_tracking(reference, measurement);
//! ```

use wasm_bindgen::prelude::*;

use crate::controller::{Saturation, StateSpaceController};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: crate::error::ControlError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible state-space controller.
#[wasm_bindgen]
pub struct WasmController {
    controller: StateSpaceController<f64>,
    limits: Option<Saturation<f64>>,
}

#[wasm_bindgen]
impl WasmController {
    /// Create a controller from the content of a data file.
    ///
    /// # Arguments
    /// * `data` - Time step, nx, ne, nu and the A, B, C, D values, one per line
    #[wasm_bindgen(constructor)]
    pub fn new(data: &str) -> Result<WasmController, JsValue> {
        let controller = StateSpaceController::from_data(data).map_err(to_js)?;
        Ok(WasmController {
            controller,
            limits: None,
        })
    }

    /// Clamp every output channel into `[min, max]` from now on.
    #[wasm_bindgen]
    pub fn set_limits(&mut self, min: f64, max: f64) -> Result<(), JsValue> {
        self.limits = Some(Saturation::uniform(min, max).map_err(to_js)?);
        Ok(())
    }

    /// Clamp each output channel into its own range from now on.
    #[wasm_bindgen]
    pub fn set_channel_limits(&mut self, min: Vec<f64>, max: Vec<f64>) -> Result<(), JsValue> {
        let limits = Saturation::per_channel(min, max).map_err(to_js)?;
        limits.check(self.controller.output_dim()).map_err(to_js)?;
        self.limits = Some(limits);
        Ok(())
    }

    /// Stop clamping the output.
    #[wasm_bindgen]
    pub fn clear_limits(&mut self) {
        self.limits = None;
    }

    /// Run one cycle from an error vector and return the output.
    #[wasm_bindgen]
    pub fn step(&mut self, error: &[f64]) -> Result<Vec<f64>, JsValue> {
        let output = match &self.limits {
            Some(limits) => self.controller.current_output_saturated(error, limits),
            None => self.controller.current_output(error),
        };
        output.map_err(to_js)
    }

    /// Run one cycle from a reference and a measurement and return the output.
    #[wasm_bindgen]
    pub fn step_tracking(&mut self, reference: &[f64], measurement: &[f64]) -> Result<Vec<f64>, JsValue> {
        let output = match &self.limits {
            Some(limits) => {
                self.controller
                    .current_output_tracking_saturated(reference, measurement, limits)
            }
            None => self.controller.current_output_tracking(reference, measurement),
        };
        output.map_err(to_js)
    }

    /// Zero the state, iteration counter and time.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Current state vector.
    #[wasm_bindgen]
    pub fn state(&self) -> Vec<f64> {
        self.controller.state().to_vec()
    }

    /// Time reported by the last cycle, in seconds.
    #[wasm_bindgen(getter)]
    pub fn time(&self) -> f64 {
        self.controller.time()
    }

    /// Number of completed cycles.
    #[wasm_bindgen(getter)]
    pub fn iteration(&self) -> f64 {
        self.controller.iteration() as f64
    }

    /// Coefficient summary, values rounded for display.
    #[wasm_bindgen]
    pub fn summary(&self) -> String {
        self.controller.summary()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
