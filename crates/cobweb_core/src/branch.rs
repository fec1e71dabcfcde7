use crate::sweep::ParamSweep;
use crate::traits::{Scalar, ScalarMap};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Stability classification of a bifurcation branch. Renderers pick the
/// line style from this tag (solid for stable, dashed for unstable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Unstable,
}

/// A fixed-point curve x*(r) sampled over a parameter sweep, tagged with
/// its stability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCurve<T> {
    pub stability: Stability,
    /// (parameter, state) pairs in ascending parameter order.
    pub points: Vec<[T; 2]>,
}

/// Samples the scalar function `f` of the parameter at every sweep value.
/// The stability tag is carried through untouched; no analysis is done
/// here, the caller asserts what the branch is.
pub fn branch_curve<T: Scalar>(
    f: &impl ScalarMap<T>,
    stability: Stability,
    sweep: ParamSweep<T>,
) -> Result<BranchCurve<T>> {
    sweep.validate()?;
    let points = sweep.values().map(|r| [r, f.eval(r)]).collect();
    Ok(BranchCurve { stability, points })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_samples_every_sweep_value() {
        let f = |r: f64| 1.0 - 1.0 / r;
        let curve = branch_curve(&f, Stability::Stable, ParamSweep::new(1.0, 3.0, 0.5)).unwrap();
        assert_eq!(curve.stability, Stability::Stable);
        assert_eq!(curve.points.len(), 5);
        assert_eq!(curve.points[0], [1.0, 0.0]);
        assert_eq!(curve.points[4], [3.0, 1.0 - 1.0 / 3.0]);
    }

    #[test]
    fn test_tag_is_carried_through() {
        let f = |_r: f64| 0.0;
        let curve = branch_curve(&f, Stability::Unstable, ParamSweep::new(0.0, 1.0, 1.0)).unwrap();
        assert_eq!(curve.stability, Stability::Unstable);
    }

    #[test]
    fn test_invalid_sweep_is_rejected() {
        let f = |r: f64| r;
        assert!(branch_curve(&f, Stability::Stable, ParamSweep::new(0.0, 1.0, 0.0)).is_err());
        assert!(branch_curve(&f, Stability::Stable, ParamSweep::new(2.0, 1.0, 0.5)).is_err());
    }
}
