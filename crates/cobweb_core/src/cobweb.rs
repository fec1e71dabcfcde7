use crate::traits::{Scalar, ScalarMap};
use serde::{Deserialize, Serialize};

/// A line segment between two (x, y) points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment<T> {
    pub from: [T; 2],
    pub to: [T; 2],
}

/// The renderable pieces of a cobweb plot for x_{n+1} = f(x_n):
/// the graph of f, the identity line, and the iteration staircase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CobwebDiagram<T> {
    /// Sampled graph of f over [x_min, x_max], drawn behind the staircase.
    pub curve: Vec<[T; 2]>,
    /// Endpoints of the identity line y = x over the interval.
    pub diagonal: [[T; 2]; 2],
    /// Alternating vertical/horizontal staircase segments, starting with
    /// the vertical rise from (x0, 0).
    pub steps: Vec<Segment<T>>,
}

/// Constructs cobweb plot data for `iterations` applications of `f` from
/// `x0`. Returns `None` when `x0` is not strictly inside
/// (`x_min`, `x_max`) — the no-op signal, not a failure. A degenerate or
/// reversed interval has an empty interior, so it is always a no-op.
///
/// `curve_points` is the number of abscissae used to sample the graph of
/// f, endpoints included; fewer than two are bumped to two.
pub fn cobweb_diagram<T: Scalar>(
    f: &impl ScalarMap<T>,
    x0: T,
    x_min: T,
    x_max: T,
    iterations: usize,
    curve_points: usize,
) -> Option<CobwebDiagram<T>> {
    if !(x0 > x_min && x0 < x_max) {
        return None;
    }

    let n = curve_points.max(2);
    let span = x_max - x_min;
    let denom = T::from_usize(n - 1).unwrap();
    let curve = (0..n)
        .map(|i| {
            let x = x_min + span * T::from_usize(i).unwrap() / denom;
            [x, f.eval(x)]
        })
        .collect();

    let diagonal = [[x_min, x_min], [x_max, x_max]];

    // Staircase: rise from the axis to the curve, then across to the
    // diagonal, repeated from each image point.
    let mut steps = Vec::with_capacity(2 * iterations);
    let mut last_x = x0;
    let mut last_y = T::zero();
    for _ in 0..iterations {
        let next = f.eval(last_x);
        steps.push(Segment {
            from: [last_x, last_y],
            to: [last_x, next],
        });
        steps.push(Segment {
            from: [last_x, next],
            to: [next, next],
        });
        last_x = next;
        last_y = next;
    }

    Some(CobwebDiagram {
        curve,
        diagonal,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve(x: f64) -> f64 {
        x / 2.0
    }

    #[test]
    fn test_initial_state_on_boundary_is_a_noop() {
        assert!(cobweb_diagram(&halve, 0.0, 0.0, 1.0, 10, 16).is_none());
        assert!(cobweb_diagram(&halve, 1.0, 0.0, 1.0, 10, 16).is_none());
        assert!(cobweb_diagram(&halve, -0.5, 0.0, 1.0, 10, 16).is_none());
        assert!(cobweb_diagram(&halve, 1.5, 0.0, 1.0, 10, 16).is_none());
        assert!(cobweb_diagram(&halve, f64::NAN, 0.0, 1.0, 10, 16).is_none());
    }

    #[test]
    fn test_empty_interval_is_a_noop() {
        assert!(cobweb_diagram(&halve, 0.5, 1.0, 0.0, 10, 16).is_none());
        assert!(cobweb_diagram(&halve, 0.5, 0.5, 0.5, 10, 16).is_none());
    }

    #[test]
    fn test_staircase_alternates_vertical_and_horizontal() {
        let diagram = cobweb_diagram(&halve, 0.5, 0.0, 1.0, 3, 16).unwrap();
        assert_eq!(diagram.steps.len(), 6);

        // Rise from the axis at x0, then across to the diagonal.
        assert_eq!(diagram.steps[0].from, [0.5, 0.0]);
        assert_eq!(diagram.steps[0].to, [0.5, 0.25]);
        assert_eq!(diagram.steps[1].from, [0.5, 0.25]);
        assert_eq!(diagram.steps[1].to, [0.25, 0.25]);
        assert_eq!(diagram.steps[2].from, [0.25, 0.25]);
        assert_eq!(diagram.steps[2].to, [0.25, 0.125]);

        for (k, segment) in diagram.steps.iter().enumerate() {
            if k % 2 == 0 {
                assert_eq!(segment.from[0], segment.to[0], "segment {} not vertical", k);
            } else {
                assert_eq!(segment.from[1], segment.to[1], "segment {} not horizontal", k);
            }
        }
    }

    #[test]
    fn test_curve_spans_interval_inclusive() {
        let diagram = cobweb_diagram(&halve, 0.5, 0.0, 2.0, 1, 5).unwrap();
        let xs: Vec<f64> = diagram.curve.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(diagram.curve.iter().all(|p| p[1] == p[0] / 2.0));
        assert_eq!(diagram.diagonal, [[0.0, 0.0], [2.0, 2.0]]);
    }

    #[test]
    fn test_curve_point_floor_is_two() {
        let diagram = cobweb_diagram(&halve, 0.5, 0.0, 1.0, 1, 0).unwrap();
        assert_eq!(diagram.curve.len(), 2);
        assert_eq!(diagram.curve[0][0], 0.0);
        assert_eq!(diagram.curve[1][0], 1.0);
    }

    #[test]
    fn test_zero_iterations_keep_backdrop_only() {
        let diagram = cobweb_diagram(&halve, 0.5, 0.0, 1.0, 0, 8).unwrap();
        assert!(diagram.steps.is_empty());
        assert_eq!(diagram.curve.len(), 8);
    }
}
