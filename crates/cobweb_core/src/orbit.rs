use crate::sweep::ParamSweep;
use crate::traits::{ParamMap, Scalar};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single (parameter, state) sample of an orbit diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitPoint<T> {
    pub param: T,
    pub state: T,
}

/// The sampled data of an orbit (bifurcation) diagram.
///
/// Points belonging to one parameter value are contiguous and parameter
/// values ascend, so a renderer can stream the buffer directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitDiagram<T> {
    pub points: Vec<OrbitPoint<T>>,
    /// Number of parameter columns sampled.
    pub param_count: usize,
    /// Post-transient samples retained per column.
    pub samples_per_param: usize,
}

impl<T: Scalar> OrbitDiagram<T> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with finite state, for renderers that cannot digest NaN or
    /// infinities. The sampler itself never filters.
    pub fn finite_points(&self) -> impl Iterator<Item = &OrbitPoint<T>> {
        self.points.iter().filter(|p| p.state.is_finite())
    }
}

/// Samples an orbit diagram for the one-parameter family `map`.
///
/// For each parameter value in `sweep` the state is reset to `x0` and the
/// map iterated `skip + iterations` times; once the iteration index reaches
/// `skip`, the current state is recorded before each application. The
/// output holds exactly `sweep.sample_count() * iterations` points.
/// Non-finite states are recorded as-is; filtering is the renderer's call.
pub fn orbit_diagram<T: Scalar>(
    map: &impl ParamMap<T>,
    x0: T,
    skip: usize,
    iterations: usize,
    sweep: ParamSweep<T>,
) -> Result<OrbitDiagram<T>> {
    sweep.validate()?;

    let param_count = sweep.sample_count();
    let mut points = Vec::with_capacity(param_count * iterations);

    for r in sweep.values() {
        let mut x = x0;
        for i in 0..skip + iterations {
            if i >= skip {
                points.push(OrbitPoint { param: r, state: x });
            }
            x = map.apply(r, x);
        }
    }

    Ok(OrbitDiagram {
        points,
        param_count,
        samples_per_param: iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic(r: f64, x: f64) -> f64 {
        r * x * (1.0 - x)
    }

    #[test]
    fn test_zero_iterations_yield_empty_diagram() {
        let diagram = orbit_diagram(&logistic, 0.5, 300, 0, ParamSweep::new(0.0, 4.0, 0.5)).unwrap();
        assert!(diagram.is_empty());
        assert_eq!(diagram.param_count, 9);
        assert_eq!(diagram.samples_per_param, 0);
    }

    #[test]
    fn test_point_count_is_columns_times_iterations() {
        let sweep = ParamSweep::new(2.5, 3.5, 0.25);
        let diagram = orbit_diagram(&logistic, 0.5, 100, 7, sweep).unwrap();
        assert_eq!(diagram.len(), sweep.sample_count() * 7);
        assert_eq!(diagram.param_count, 5);
    }

    #[test]
    fn test_columns_are_contiguous_and_ascending() {
        let diagram = orbit_diagram(&logistic, 0.5, 10, 4, ParamSweep::new(1.0, 2.0, 0.5)).unwrap();
        let params: Vec<f64> = diagram.points.iter().map(|p| p.param).collect();
        assert_eq!(
            params,
            vec![1.0, 1.0, 1.0, 1.0, 1.5, 1.5, 1.5, 1.5, 2.0, 2.0, 2.0, 2.0]
        );
    }

    #[test]
    fn test_identity_map_holds_initial_state() {
        let identity = |_r: f64, x: f64| x;
        let diagram = orbit_diagram(&identity, 0.3, 0, 5, ParamSweep::new(0.0, 1.0, 0.5)).unwrap();
        assert!(diagram.points.iter().all(|p| p.state == 0.3));
    }

    #[test]
    fn test_logistic_fixed_point_column() {
        // 0.5 is a fixed point of the logistic map at r = 2: every retained
        // sample sits on it.
        let diagram = orbit_diagram(&logistic, 0.5, 0, 3, ParamSweep::new(2.0, 2.0, 1.0)).unwrap();
        let pairs: Vec<(f64, f64)> = diagram.points.iter().map(|p| (p.param, p.state)).collect();
        assert_eq!(pairs, vec![(2.0, 0.5), (2.0, 0.5), (2.0, 0.5)]);
    }

    #[test]
    fn test_invalid_sweep_is_rejected() {
        assert!(orbit_diagram(&logistic, 0.5, 0, 3, ParamSweep::new(0.0, 4.0, 0.0)).is_err());
        assert!(orbit_diagram(&logistic, 0.5, 0, 3, ParamSweep::new(0.0, 4.0, -1.0)).is_err());
        assert!(orbit_diagram(&logistic, 0.5, 0, 3, ParamSweep::new(4.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_non_finite_states_pass_through() {
        let blowup = |_r: f64, _x: f64| f64::NAN;
        let diagram = orbit_diagram(&blowup, 0.3, 0, 3, ParamSweep::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(diagram.len(), 3);
        assert_eq!(diagram.points[0].state, 0.3);
        assert!(diagram.points[1].state.is_nan());
        assert!(diagram.points[2].state.is_nan());
        assert_eq!(diagram.finite_points().count(), 1);
    }

    #[test]
    fn test_transient_is_discarded() {
        let shift = |_r: f64, x: f64| x + 1.0;
        let diagram = orbit_diagram(&shift, 0.0, 2, 3, ParamSweep::new(0.0, 0.0, 1.0)).unwrap();
        let states: Vec<f64> = diagram.points.iter().map(|p| p.state).collect();
        assert_eq!(states, vec![2.0, 3.0, 4.0]);
    }
}
