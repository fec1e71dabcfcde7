use crate::traits::{ParamMap, Scalar};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A fixed-step trajectory sample of the scalar flow dx/dt = f(r, x).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTrace<T> {
    pub t0: T,
    pub dt: T,
    /// States at t0, t0 + dt, ..., t0 + steps * dt; the initial state is
    /// included, so there is always at least one value.
    pub values: Vec<T>,
}

impl<T: Scalar> FlowTrace<T> {
    /// (t, x) pairs ready to plot against the time axis.
    pub fn points(&self) -> impl Iterator<Item = [T; 2]> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &x)| [self.t0 + T::from_usize(i).unwrap() * self.dt, x])
    }
}

/// Classic Runge-Kutta 4th order step for a scalar autonomous field.
fn rk4_step<T: Scalar>(field: &impl ParamMap<T>, r: T, x: T, dt: T) -> T {
    let half = T::from_f64(0.5).unwrap();
    let sixth = T::from_f64(1.0 / 6.0).unwrap();
    let two = T::from_f64(2.0).unwrap();

    let k1 = field.apply(r, x);
    let k2 = field.apply(r, x + dt * k1 * half);
    let k3 = field.apply(r, x + dt * k2 * half);
    let k4 = field.apply(r, x + dt * k3);

    x + dt * sixth * (k1 + two * k2 + two * k3 + k4)
}

/// Integrates the 1D flow dx/dt = f(r, x) with fixed-step RK4, the
/// parameter frozen at `r` for the whole trace. No adaptivity and no error
/// control; the step is taken exactly `steps` times. `steps == 0` is legal
/// and yields just the initial state.
pub fn flow_trace<T: Scalar>(
    field: &impl ParamMap<T>,
    r: T,
    x0: T,
    t0: T,
    dt: T,
    steps: usize,
) -> Result<FlowTrace<T>> {
    if !dt.is_finite() || dt <= T::zero() {
        bail!("Step size dt must be positive.");
    }

    let mut values = Vec::with_capacity(steps + 1);
    values.push(x0);
    let mut x = x0;
    for _ in 0..steps {
        x = rk4_step(field, r, x, dt);
        values.push(x);
    }

    Ok(FlowTrace { t0, dt, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_step_is_rejected() {
        let field = |_r: f64, x: f64| -x;
        assert!(flow_trace(&field, 0.0, 1.0, 0.0, 0.0, 10).is_err());
        assert!(flow_trace(&field, 0.0, 1.0, 0.0, -0.1, 10).is_err());
        assert!(flow_trace(&field, 0.0, 1.0, 0.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn test_constant_field_advances_linearly() {
        // dx/dt = r is exact under RK4.
        let field = |r: f64, _x: f64| r;
        let trace = flow_trace(&field, 2.0, 1.0, 0.0, 0.25, 4).unwrap();
        assert_eq!(trace.values.len(), 5);
        for (i, &x) in trace.values.iter().enumerate() {
            assert!((x - (1.0 + 0.5 * i as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_exponential_decay_matches_closed_form() {
        let field = |_r: f64, x: f64| -x;
        let trace = flow_trace(&field, 0.0, 1.0, 0.0, 0.01, 100).unwrap();
        let end = *trace.values.last().unwrap();
        assert!((end - (-1.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_zero_steps_keep_initial_state_only() {
        let field = |_r: f64, x: f64| -x;
        let trace = flow_trace(&field, 0.0, 0.7, 1.5, 0.1, 0).unwrap();
        assert_eq!(trace.values, vec![0.7]);
    }

    #[test]
    fn test_points_pair_states_with_times() {
        let field = |r: f64, _x: f64| r;
        let trace = flow_trace(&field, 1.0, 0.0, 2.0, 0.5, 2).unwrap();
        let points: Vec<[f64; 2]> = trace.points().collect();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], [2.0, 0.0]);
        assert!((points[2][0] - 3.0).abs() < 1e-12);
        assert!((points[2][1] - 1.0).abs() < 1e-12);
    }
}
