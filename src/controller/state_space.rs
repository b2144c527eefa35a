//! The state-space controller and its per-cycle recurrence.

use tracing::debug;

use crate::error::{ControlError, Result};
use crate::matrix::{vector_add, vector_sub, zeros, Matrix, Scalar};

use super::Saturation;

/// A discrete-time linear controller in state-space form.
///
/// Each cycle computes
///
/// ```text
/// u[i]   = C x[i] + D e[i]
/// x[i+1] = A x[i] + B e[i]
/// ```
///
/// with `A: nx x nx`, `B: nx x ne`, `C: nu x nx`, `D: nu x ne`. The
/// dimensions are derived from the matrices at construction and checked for
/// consistency; every signal buffer keeps the length they imply.
///
/// A cycle either completes fully or leaves the controller exactly as it
/// was: all validation and arithmetic happen before any field is written.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceController<T> {
    a: Matrix<T>,
    b: Matrix<T>,
    c: Matrix<T>,
    d: Matrix<T>,
    /// Time step in seconds
    time_step: f64,

    nx: usize,
    ne: usize,
    nu: usize,

    /// Current state x[i]
    x: Vec<T>,
    /// State before the last update (diagnostics only)
    x_prev: Vec<T>,
    /// Last reference r
    r: Vec<T>,
    /// Last measurement y
    y: Vec<T>,
    /// Last error e
    e: Vec<T>,
    /// Last output u
    u: Vec<T>,

    iteration: u64,
    time: f64,
}

impl<T: Scalar> StateSpaceController<T> {
    /// Create a controller from its coefficient matrices and time step.
    ///
    /// Fails with [`ControlError::DimensionMismatch`] if the shapes are not
    /// mutually consistent and with [`ControlError::InvalidTimeStep`] if
    /// `time_step` is not positive and finite. State and signals start at zero.
    pub fn new(
        a: Matrix<T>,
        b: Matrix<T>,
        c: Matrix<T>,
        d: Matrix<T>,
        time_step: f64,
    ) -> Result<Self> {
        check_time_step(time_step)?;
        let (nx, ne, nu) = check_dimensions(&a, &b, &c, &d)?;

        debug!(nx, ne, nu, time_step, "created state-space controller");

        Ok(Self {
            a,
            b,
            c,
            d,
            time_step,
            nx,
            ne,
            nu,
            x: zeros(nx),
            x_prev: zeros(nx),
            r: zeros(ne),
            y: zeros(ne),
            e: zeros(ne),
            u: zeros(nu),
            iteration: 0,
            time: 0.0,
        })
    }

    /// A new controller with the same coefficients and time step, with all
    /// signals and counters back at zero.
    pub fn fresh_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_signals();
        copy.iteration = 0;
        copy.time = 0.0;
        copy
    }

    /// Take over the coefficients, time step and dimensions of `other`.
    ///
    /// Signal buffers are re-created as zero vectors of the new dimensions.
    /// The iteration counter and time are kept.
    pub fn assign_from(&mut self, other: &Self) {
        self.a = other.a.clone();
        self.b = other.b.clone();
        self.c = other.c.clone();
        self.d = other.d.clone();
        self.time_step = other.time_step;
        self.nx = other.nx;
        self.ne = other.ne;
        self.nu = other.nu;
        self.clear_signals();
    }

    fn clear_signals(&mut self) {
        self.x = zeros(self.nx);
        self.x_prev = zeros(self.nx);
        self.r = zeros(self.ne);
        self.y = zeros(self.ne);
        self.e = zeros(self.ne);
        self.u = zeros(self.nu);
    }

    /// Compute the output for error `e` and advance one cycle.
    ///
    /// Not idempotent: every successful call advances state and time.
    pub fn current_output(&mut self, e: &[T]) -> Result<Vec<T>> {
        self.step(e, None)
    }

    /// Like [`current_output`](Self::current_output), with the returned
    /// output clamped into `limits`.
    pub fn current_output_saturated(&mut self, e: &[T], limits: &Saturation<T>) -> Result<Vec<T>> {
        self.step(e, Some(limits))
    }

    /// Compute `e = r - y`, then the output, and advance one cycle.
    pub fn current_output_tracking(&mut self, r: &[T], y: &[T]) -> Result<Vec<T>> {
        self.track(r, y, None)
    }

    /// Like [`current_output_tracking`](Self::current_output_tracking), with
    /// the returned output clamped into `limits`.
    pub fn current_output_tracking_saturated(
        &mut self,
        r: &[T],
        y: &[T],
        limits: &Saturation<T>,
    ) -> Result<Vec<T>> {
        self.track(r, y, Some(limits))
    }

    /// Clamp the stored output into `limits`.
    pub fn saturate(&mut self, limits: &Saturation<T>) -> Result<()> {
        limits.apply(&mut self.u)
    }

    /// Zero the state and the counters. Coefficients and the last
    /// r, y, e, u are left as they are.
    pub fn reset(&mut self) {
        self.x = zeros(self.nx);
        self.iteration = 0;
        self.time = 0.0;
        debug!("controller state reset");
    }

    fn track(&mut self, r: &[T], y: &[T], limits: Option<&Saturation<T>>) -> Result<Vec<T>> {
        check_signal("reference", r, self.ne)?;
        check_signal("measurement", y, self.ne)?;
        let e = vector_sub(r, y)?;

        let u = self.step(&e, limits)?;
        self.r = r.to_vec();
        self.y = y.to_vec();
        Ok(u)
    }

    fn step(&mut self, e: &[T], limits: Option<&Saturation<T>>) -> Result<Vec<T>> {
        check_signal("error", e, self.ne)?;

        let mut u = vector_add(&self.c.mul_vec(&self.x)?, &self.d.mul_vec(e)?)?;
        if let Some(limits) = limits {
            limits.apply(&mut u)?;
        }
        let x_next = self.next_state(e)?;

        self.e = e.to_vec();
        self.u = u.clone();
        self.advance(x_next);
        Ok(u)
    }

    /// `A x + B e`, from the unsaturated error.
    fn next_state(&self, e: &[T]) -> Result<Vec<T>> {
        vector_add(&self.a.mul_vec(&self.x)?, &self.b.mul_vec(e)?)
    }

    // Time is taken from the counter before the increment, so it reports
    // the instant of the state that was just replaced.
    fn advance(&mut self, x_next: Vec<T>) {
        self.x_prev = std::mem::replace(&mut self.x, x_next);
        self.time = self.iteration as f64 * self.time_step;
        self.iteration += 1;
    }

    /// State transition matrix A.
    pub fn a(&self) -> &Matrix<T> {
        &self.a
    }

    /// Input-to-state matrix B.
    pub fn b(&self) -> &Matrix<T> {
        &self.b
    }

    /// State-to-output matrix C.
    pub fn c(&self) -> &Matrix<T> {
        &self.c
    }

    /// Feedthrough matrix D.
    pub fn d(&self) -> &Matrix<T> {
        &self.d
    }

    /// Replace A. Must keep the `nx x nx` shape.
    pub fn set_a(&mut self, a: Matrix<T>) -> Result<()> {
        check_shape("A", &a, (self.nx, self.nx))?;
        self.a = a;
        Ok(())
    }

    /// Replace B. Must keep the `nx x ne` shape.
    pub fn set_b(&mut self, b: Matrix<T>) -> Result<()> {
        check_shape("B", &b, (self.nx, self.ne))?;
        self.b = b;
        Ok(())
    }

    /// Replace C. Must keep the `nu x nx` shape.
    pub fn set_c(&mut self, c: Matrix<T>) -> Result<()> {
        check_shape("C", &c, (self.nu, self.nx))?;
        self.c = c;
        Ok(())
    }

    /// Replace D. Must keep the `nu x ne` shape.
    pub fn set_d(&mut self, d: Matrix<T>) -> Result<()> {
        check_shape("D", &d, (self.nu, self.ne))?;
        self.d = d;
        Ok(())
    }

    /// Time step in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Change the time step. Takes effect from the next cycle.
    pub fn set_time_step(&mut self, time_step: f64) -> Result<()> {
        check_time_step(time_step)?;
        self.time_step = time_step;
        Ok(())
    }

    /// Current state x.
    pub fn state(&self) -> &[T] {
        &self.x
    }

    /// State before the last update.
    pub fn previous_state(&self) -> &[T] {
        &self.x_prev
    }

    /// Last reference r.
    pub fn reference(&self) -> &[T] {
        &self.r
    }

    /// Last measurement y.
    pub fn measurement(&self) -> &[T] {
        &self.y
    }

    /// Last error e.
    pub fn error(&self) -> &[T] {
        &self.e
    }

    /// Last output u, after any saturation.
    pub fn output(&self) -> &[T] {
        &self.u
    }

    /// Number of completed cycles since construction or the last reset.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Time reported by the last cycle, `(iteration - 1) * time_step`.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// State dimension.
    pub fn state_dim(&self) -> usize {
        self.nx
    }

    /// Error (and reference/measurement) dimension.
    pub fn error_dim(&self) -> usize {
        self.ne
    }

    /// Output dimension.
    pub fn output_dim(&self) -> usize {
        self.nu
    }
}

impl<T: Scalar> Default for StateSpaceController<T> {
    /// 1x1 pass-through: A = B = C = 0, D = 1, time step 1 s.
    fn default() -> Self {
        Self {
            a: Matrix::zeros(1, 1),
            b: Matrix::zeros(1, 1),
            c: Matrix::zeros(1, 1),
            d: Matrix::new(1, 1, T::one()),
            time_step: 1.0,
            nx: 1,
            ne: 1,
            nu: 1,
            x: zeros(1),
            x_prev: zeros(1),
            r: zeros(1),
            y: zeros(1),
            e: zeros(1),
            u: zeros(1),
            iteration: 0,
            time: 0.0,
        }
    }
}

pub(crate) fn check_time_step(time_step: f64) -> Result<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(ControlError::InvalidTimeStep { value: time_step })
    }
}

/// Derive `(nx, ne, nu)` and check that all four shapes agree with them.
fn check_dimensions<T: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    c: &Matrix<T>,
    d: &Matrix<T>,
) -> Result<(usize, usize, usize)> {
    let nx = a.rows();
    let ne = b.cols();
    let nu = c.rows();

    if nx == 0 || ne == 0 || nu == 0 {
        return Err(ControlError::dimension(format!(
            "dimensions must be positive, got nx={nx}, ne={ne}, nu={nu}"
        )));
    }

    check_shape("A", a, (nx, nx))?;
    check_shape("B", b, (nx, ne))?;
    check_shape("C", c, (nu, nx))?;
    check_shape("D", d, (nu, ne))?;

    Ok((nx, ne, nu))
}

fn check_shape<T: Scalar>(name: &str, m: &Matrix<T>, expected: (usize, usize)) -> Result<()> {
    if m.shape() != expected {
        return Err(ControlError::dimension(format!(
            "{name} is {}x{}, expected {}x{}",
            m.rows(),
            m.cols(),
            expected.0,
            expected.1
        )));
    }
    Ok(())
}

fn check_signal<T>(name: &str, v: &[T], expected: usize) -> Result<()> {
    if v.len() != expected {
        return Err(ControlError::dimension(format!(
            "{name} vector has length {}, expected {expected}",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// nx = ne = nu = 1, an integrator whose output is the state.
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

    /// nx = 2, ne = 2, nu = 1 with non-trivial coefficients.
    fn mimo() -> StateSpaceController<f64> {
        StateSpaceController::new(
            Matrix::from_rows(vec![vec![0.5, 0.1], vec![0.0, 0.9]]).unwrap(),
            Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.5, 2.0]]).unwrap(),
            Matrix::from_rows(vec![vec![1.0, -1.0]]).unwrap(),
            Matrix::from_rows(vec![vec![0.25, 0.0]]).unwrap(),
            0.01,
        )
        .unwrap()
    }

    #[test]
    fn test_integrator_outputs() {
        let mut ctrl = integrator();
        assert_eq!(ctrl.current_output(&[1.0]).unwrap(), vec![0.0]);
        assert_eq!(ctrl.current_output(&[1.0]).unwrap(), vec![1.0]);
        assert_eq!(ctrl.current_output(&[1.0]).unwrap(), vec![2.0]);
        assert_eq!(ctrl.state(), &[3.0]);
        assert_eq!(ctrl.previous_state(), &[2.0]);
    }

    #[test]
    fn test_saturation_does_not_touch_state() {
        let mut ctrl = integrator();
        let limits = Saturation::per_channel(vec![0.0], vec![1.0]).unwrap();
        let outputs: Vec<Vec<f64>> = (0..3)
            .map(|_| ctrl.current_output_saturated(&[1.0], &limits).unwrap())
            .collect();
        assert_eq!(outputs, vec![vec![0.0], vec![1.0], vec![1.0]]);
        // The unsaturated output of the last cycle was 2.0.
        assert_eq!(ctrl.previous_state(), &[2.0]);
        assert_eq!(ctrl.state(), &[3.0]);
        assert_eq!(ctrl.output(), &[1.0]);
    }

    #[test]
    fn test_uniform_saturation() {
        let mut ctrl = integrator();
        let limits = Saturation::uniform(-0.5, 0.5).unwrap();
        for _ in 0..4 {
            ctrl.current_output_saturated(&[1.0], &limits).unwrap();
        }
        assert_eq!(ctrl.output(), &[0.5]);
        assert_eq!(ctrl.state(), &[4.0]);
    }

    #[test]
    fn test_tracking_computes_error() {
        let mut ctrl = integrator();
        ctrl.current_output_tracking(&[3.0], &[1.0]).unwrap();
        assert_eq!(ctrl.reference(), &[3.0]);
        assert_eq!(ctrl.measurement(), &[1.0]);
        assert_eq!(ctrl.error(), &[2.0]);
        assert_eq!(ctrl.state(), &[2.0]);

        let limits = Saturation::uniform(0.0, 1.0).unwrap();
        let u = ctrl
            .current_output_tracking_saturated(&[0.0], &[1.0], &limits)
            .unwrap();
        assert_eq!(u, vec![1.0]);
        assert_eq!(ctrl.error(), &[-1.0]);
        assert_eq!(ctrl.state(), &[1.0]);
    }

    #[test]
    fn test_mimo_step() {
        let mut ctrl = mimo();
        assert_eq!((ctrl.state_dim(), ctrl.error_dim(), ctrl.output_dim()), (2, 2, 1));

        let u0 = ctrl.current_output(&[1.0, 1.0]).unwrap();
        assert_relative_eq!(u0[0], 0.25);
        assert_relative_eq!(ctrl.state()[0], 1.0);
        assert_relative_eq!(ctrl.state()[1], 2.5);

        // u1 = C x1 + D e = (1.0 - 2.5) + 0.25 * 2
        let u1 = ctrl.current_output(&[2.0, 0.0]).unwrap();
        assert_relative_eq!(u1[0], -1.0);
        // x2 = A x1 + B e = [0.5 + 0.25 + 2, 2.25 + 1]
        assert_relative_eq!(ctrl.state()[0], 2.75);
        assert_relative_eq!(ctrl.state()[1], 3.25);
    }

    #[test]
    fn test_time_lags_iteration() {
        let mut ctrl = mimo();
        let mut times = Vec::new();
        for _ in 0..5 {
            ctrl.current_output(&[0.0, 0.0]).unwrap();
            times.push(ctrl.time());
        }
        assert_eq!(ctrl.iteration(), 5);
        assert_relative_eq!(times[0], 0.0);
        assert_relative_eq!(times[1], 0.01);
        assert_relative_eq!(ctrl.time(), 4.0 * 0.01);
    }

    #[test]
    fn test_determinism() {
        let mut first = mimo();
        let mut second = mimo();
        let inputs = [[1.0, -0.5], [0.3, 0.7], [-2.0, 0.0], [0.1, 0.1]];
        for e in &inputs {
            let u1 = first.current_output(e).unwrap();
            let u2 = second.current_output(e).unwrap();
            assert_eq!(u1, u2);
            assert_eq!(first.state(), second.state());
            assert_eq!(first.time().to_bits(), second.time().to_bits());
        }
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut ctrl = mimo();
        let reference = mimo();
        for _ in 0..3 {
            ctrl.current_output_tracking(&[1.0, 2.0], &[0.5, 0.5]).unwrap();
        }
        ctrl.reset();
        assert_eq!(ctrl.state(), &[0.0, 0.0]);
        assert_eq!(ctrl.iteration(), 0);
        assert_eq!(ctrl.time(), 0.0);
        assert_eq!(ctrl.a(), reference.a());
        assert_eq!(ctrl.b(), reference.b());
        assert_eq!(ctrl.c(), reference.c());
        assert_eq!(ctrl.d(), reference.d());
        assert_eq!(ctrl.time_step(), reference.time_step());
        // Last signals are kept for display.
        assert_eq!(ctrl.reference(), &[1.0, 2.0]);
    }

    #[test]
    fn test_rejects_inconsistent_matrices() {
        let err = StateSpaceController::new(
            Matrix::new(2, 2, 0.0),
            Matrix::new(2, 1, 0.0),
            Matrix::new(1, 3, 0.0),
            Matrix::new(1, 1, 0.0),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::DimensionMismatch { .. }));

        let err = StateSpaceController::new(
            Matrix::new(2, 3, 0.0),
            Matrix::new(2, 1, 0.0),
            Matrix::new(1, 2, 0.0),
            Matrix::new(1, 1, 0.0),
            1.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("A is 2x3"));

        let err = StateSpaceController::new(
            Matrix::new(1, 1, 0.0),
            Matrix::new(1, 1, 0.0),
            Matrix::new(1, 1, 0.0),
            Matrix::new(1, 2, 0.0),
            1.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("D is 1x2"));
    }

    #[test]
    fn test_rejects_bad_time_step() {
        for ts in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = StateSpaceController::new(
                Matrix::new(1, 1, 0.0),
                Matrix::new(1, 1, 0.0),
                Matrix::new(1, 1, 0.0),
                Matrix::new(1, 1, 0.0),
                ts,
            );
            assert!(matches!(result, Err(ControlError::InvalidTimeStep { .. })));
        }

        let mut ctrl = integrator();
        assert!(ctrl.set_time_step(-0.1).is_err());
        assert_eq!(ctrl.time_step(), 1.0);
        ctrl.set_time_step(0.5).unwrap();
        assert_eq!(ctrl.time_step(), 0.5);
    }

    #[test]
    fn test_failed_cycle_leaves_state_intact() {
        let mut ctrl = mimo();
        ctrl.current_output(&[1.0, 1.0]).unwrap();
        let before = ctrl.clone();

        assert!(matches!(
            ctrl.current_output(&[1.0]),
            Err(ControlError::DimensionMismatch { .. })
        ));
        assert!(ctrl.current_output_tracking(&[1.0, 1.0], &[1.0]).is_err());

        let bad_limits = Saturation::per_channel(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            ctrl.current_output_saturated(&[1.0, 1.0], &bad_limits),
            Err(ControlError::InvalidBounds { .. })
        ));
        assert!(ctrl
            .current_output_tracking_saturated(&[1.0, 1.0], &[0.0, 0.0], &bad_limits)
            .is_err());

        assert_eq!(ctrl, before);
    }

    #[test]
    fn test_setters_keep_shapes() {
        let mut ctrl = mimo();
        assert!(ctrl.set_a(Matrix::identity(3)).is_err());
        ctrl.set_a(Matrix::identity(2)).unwrap();
        assert_eq!(ctrl.a(), &Matrix::identity(2));
        assert!(ctrl.set_b(Matrix::zeros(2, 1)).is_err());
        ctrl.set_b(Matrix::zeros(2, 2)).unwrap();
        assert!(ctrl.set_c(Matrix::zeros(2, 2)).is_err());
        ctrl.set_c(Matrix::zeros(1, 2)).unwrap();
        assert!(ctrl.set_d(Matrix::zeros(2, 1)).is_err());
        ctrl.set_d(Matrix::new(1, 2, 1.0)).unwrap();

        assert_eq!(ctrl.current_output(&[2.0, 3.0]).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_saturate_stored_output() {
        let mut ctrl = integrator();
        for _ in 0..4 {
            ctrl.current_output(&[1.0]).unwrap();
        }
        assert_eq!(ctrl.output(), &[3.0]);
        ctrl.saturate(&Saturation::uniform(0.0, 2.0).unwrap()).unwrap();
        assert_eq!(ctrl.output(), &[2.0]);
        ctrl.saturate(&Saturation::uniform(0.0, 2.0).unwrap()).unwrap();
        assert_eq!(ctrl.output(), &[2.0]);
    }

    #[test]
    fn test_default_is_pass_through() {
        let mut ctrl = StateSpaceController::<f64>::default();
        assert_eq!((ctrl.state_dim(), ctrl.error_dim(), ctrl.output_dim()), (1, 1, 1));
        assert_eq!(ctrl.time_step(), 1.0);
        assert_eq!(ctrl.current_output(&[4.0]).unwrap(), vec![4.0]);
        assert_eq!(ctrl.current_output(&[-2.0]).unwrap(), vec![-2.0]);
    }

    #[test]
    fn test_fresh_copy_and_assign() {
        let mut ctrl = mimo();
        ctrl.current_output(&[1.0, 1.0]).unwrap();

        let copy = ctrl.fresh_copy();
        assert_eq!(copy.a(), ctrl.a());
        assert_eq!(copy.state(), &[0.0, 0.0]);
        assert_eq!(copy.iteration(), 0);

        let mut other = integrator();
        other.current_output(&[1.0]).unwrap();
        other.current_output(&[1.0]).unwrap();
        other.assign_from(&ctrl);
        assert_eq!((other.state_dim(), other.error_dim(), other.output_dim()), (2, 2, 1));
        assert_eq!(other.state(), &[0.0, 0.0]);
        assert_eq!(other.output(), &[0.0]);
        assert_eq!(other.iteration(), 2);
        assert_eq!(other.time_step(), 0.01);
        other.current_output(&[1.0, 1.0]).unwrap();
    }

    #[test]
    fn test_integer_controller() {
        let mut ctrl = StateSpaceController::new(
            Matrix::new(1, 1, 1i32),
            Matrix::new(1, 1, 2),
            Matrix::new(1, 1, 1),
            Matrix::new(1, 1, 1),
            1.0,
        )
        .unwrap();
        assert_eq!(ctrl.current_output(&[1]).unwrap(), vec![1]);
        assert_eq!(ctrl.current_output(&[1]).unwrap(), vec![3]);
        assert_eq!(ctrl.state(), &[4]);
    }
}
