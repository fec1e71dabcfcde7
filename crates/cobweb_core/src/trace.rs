use crate::traits::{ParamMap, Scalar};
use serde::{Deserialize, Serialize};

/// The post-transient states of a single iterated orbit, for direct
/// visualization of convergence. `values[k]` is the state at iteration
/// `skip + k`, i.e. after `skip + k` applications of the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationTrace<T> {
    pub skip: usize,
    pub values: Vec<T>,
}

impl<T: Scalar> IterationTrace<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values paired with their absolute iteration index, ready to plot
    /// against the iteration axis.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.values.iter().enumerate().map(|(k, &x)| (self.skip + k, x))
    }
}

/// Iterates `map` at the fixed parameter `r`, starting from `x0`, for
/// `skip + iterations` applications, retaining the states whose iteration
/// index is at least `skip`. The same loop as one column of the orbit
/// diagram, kept as a trace instead of (parameter, state) pairs.
pub fn iterate_map<T: Scalar>(
    map: &impl ParamMap<T>,
    r: T,
    x0: T,
    skip: usize,
    iterations: usize,
) -> IterationTrace<T> {
    let mut values = Vec::with_capacity(iterations);
    let mut x = x0;

    for i in 0..skip + iterations {
        if i >= skip {
            values.push(x);
        }
        x = map.apply(r, x);
    }

    IterationTrace { skip, values }
}
